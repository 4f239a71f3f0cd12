use axum::{
    extract::{Query, State},
    response::Response,
};
use inventory_lib::{
    filter::{GlobalFilter, TimeRange},
    QueryParams,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::json;
use super::{ApiResult, AppState};

/// Daily core totals of the selected hosts
pub async fn host_cores(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let params = QueryParams::from(query);
    let filter = GlobalFilter::parse(&params)?;
    let range = TimeRange::parse(&params)?;
    Ok(json(&state.service.host_cores(&filter, &range).await?))
}
