use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use inventory_lib::{
    filter::{GlobalFilter, PatchAdvisorsFilter, ReportFilter, TimeRange},
    models::Caller,
    render::{MediaType, ADDM_LAYOUT, PATCH_ADVISOR_LAYOUT, SEGMENT_ADVISOR_LAYOUT},
    QueryParams,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{caller, json, negotiate_media, spreadsheet, REPORT_MEDIA};
use super::{ApiResult, AppState};

pub async fn search_addms(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    user: Option<Extension<Caller>>,
) -> ApiResult<Response> {
    let filter = ReportFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);
    let service = &state.service;

    match media {
        MediaType::Xlsx => {
            let addms = service
                .search_addms(filter.unpaged(), caller(&user))
                .await?
                .into_items();
            spreadsheet(&state, "addms", &ADDM_LAYOUT, media, &addms)
        }
        _ => Ok(json(&service.search_addms(filter, caller(&user)).await?)),
    }
}

pub async fn search_segment_advisors(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    user: Option<Extension<Caller>>,
) -> ApiResult<Response> {
    let filter = ReportFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);
    let service = &state.service;

    match media {
        MediaType::Xlsx => {
            let advisors = service
                .search_segment_advisors(filter.unpaged(), caller(&user))
                .await?
                .into_items();
            spreadsheet(
                &state,
                "segment_advisors",
                &SEGMENT_ADVISOR_LAYOUT,
                media,
                &advisors,
            )
        }
        _ => Ok(json(
            &service.search_segment_advisors(filter, caller(&user)).await?,
        )),
    }
}

pub async fn search_patch_advisors(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    user: Option<Extension<Caller>>,
) -> ApiResult<Response> {
    let mut filter = PatchAdvisorsFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);
    let service = &state.service;

    match media {
        MediaType::Xlsx => {
            filter.report = filter.report.unpaged();
            let advisors = service
                .search_patch_advisors(filter, caller(&user))
                .await?
                .into_items();
            spreadsheet(
                &state,
                "patch_advisors",
                &PATCH_ADVISOR_LAYOUT,
                media,
                &advisors,
            )
        }
        _ => Ok(json(
            &service.search_patch_advisors(filter, caller(&user)).await?,
        )),
    }
}

pub async fn list_pluggable_databases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    user: Option<Extension<Caller>>,
) -> ApiResult<Response> {
    let filter = GlobalFilter::parse(&QueryParams::from(query))?;
    let pdbs = state
        .service
        .list_pluggable_databases(filter, caller(&user))
        .await?;
    Ok(json(&pdbs))
}

pub async fn pluggable_database_changes(
    State(state): State<Arc<AppState>>,
    Path((hostname, pdb)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let range = TimeRange::parse(&QueryParams::from(query))?;
    let changes = state
        .service
        .pluggable_database_changes(&hostname, &pdb, &range)
        .await?;
    Ok(json(&changes))
}
