use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use inventory_lib::{
    filter::ReportFilter,
    models::Caller,
    render::{MediaType, POSTGRESQL_INSTANCES_LAYOUT},
    QueryParams,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{caller, json, negotiate_media, spreadsheet, REPORT_MEDIA};
use super::{ApiResult, AppState};

pub async fn search_postgresql_instances(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    user: Option<Extension<Caller>>,
) -> ApiResult<Response> {
    let filter = ReportFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);
    let service = &state.service;

    if media == MediaType::Xlsx {
        let instances = service
            .search_postgresql_instances(filter.unpaged(), caller(&user))
            .await?
            .into_items();
        return spreadsheet(
            &state,
            "postgresql_instances",
            &POSTGRESQL_INSTANCES_LAYOUT,
            media,
            &instances,
        );
    }

    Ok(json(
        &service
            .search_postgresql_instances(filter, caller(&user))
            .await?,
    ))
}
