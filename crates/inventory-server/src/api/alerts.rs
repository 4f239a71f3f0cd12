use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use inventory_lib::{
    filter::{AlertsSearchFilter, AlertsSelection},
    render::{MediaType, ALERTS_LAYOUT},
    QueryParams,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{json, negotiate_media, parse_body, spreadsheet, REPORT_MEDIA};
use super::{ApiResult, AppState};

/// Body answered by the status-changing alert routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedAlerts {
    pub updated: u64,
}

pub async fn search_alerts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let filter = AlertsSearchFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);

    if media == MediaType::Xlsx {
        let alerts = state.service.alerts_for_export(&filter).await?;
        return spreadsheet(&state, "alerts", &ALERTS_LAYOUT, media, &alerts);
    }

    Ok(json(&state.service.search_alerts(&filter).await?))
}

pub async fn ack_alerts(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Response> {
    let selection: AlertsSelection = parse_body(&body)?;
    let updated = state.service.ack_alerts(&selection).await?;
    Ok(json(&UpdatedAlerts { updated }))
}

pub async fn dismiss_alerts(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Response> {
    let selection: AlertsSelection = parse_body(&body)?;
    let updated = state.service.dismiss_alerts(&selection).await?;
    Ok(json(&UpdatedAlerts { updated }))
}
