use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inventory_lib::{
    models::{OciProfileRequest, OciRecommendation},
    ProfilesOutcome, QueryParams,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{json, json_with_status, parse_body};
use super::{ApiResult, AppState};

/// Recommendations gathered over several profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<OciRecommendation>,
    /// Set when some of the requested profiles could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 200 with every item, or 206 with the failures listed alongside
fn recommendations_response(
    state: &AppState,
    route: &str,
    outcome: ProfilesOutcome<OciRecommendation>,
) -> Response {
    if outcome.is_partial() {
        state.logger.log_partial_content(route, outcome.errors.len());
        let body = RecommendationsResponse {
            error: Some(outcome.errors.to_string()),
            recommendations: outcome.items,
        };
        return json_with_status(StatusCode::PARTIAL_CONTENT, &body);
    }
    json(&RecommendationsResponse {
        recommendations: outcome.items,
        error: None,
    })
}

pub async fn oci_unused_load_balancers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let ids = QueryParams::from(query).list("ids");
    let outcome = state.service.oci_unused_load_balancers(&ids).await?;
    Ok(recommendations_response(
        &state,
        "/oracle-cloud/loadbalancers",
        outcome,
    ))
}

pub async fn oci_recommendations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let ids = QueryParams::from(query).list("ids");
    let outcome = state.service.oci_recommendations(&ids, None).await?;
    Ok(recommendations_response(
        &state,
        "/oracle-cloud/recommendations",
        outcome,
    ))
}

pub async fn list_oci_profiles(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    Ok(json(&state.service.list_oci_profiles().await?))
}

pub async fn add_oci_profile(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: OciProfileRequest = parse_body(&body)?;
    Ok(json(&state.service.add_oci_profile(request).await?))
}

pub async fn update_oci_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: OciProfileRequest = parse_body(&body)?;
    Ok(json(&state.service.update_oci_profile(&id, request).await?))
}

pub async fn delete_oci_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    state.service.delete_oci_profile(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn aws_recommendations(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    Ok(json(&state.service.aws_recommendations().await?))
}

pub async fn last_aws_recommendations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    Ok(json(&state.service.last_aws_recommendations().await?))
}
