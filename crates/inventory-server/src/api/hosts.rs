use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use inventory_lib::{
    filter::{GlobalFilter, HostsFilter, HostsMode},
    models::HostDocument,
    render::{MediaType, HOSTS_LAYOUT, LMS_LAYOUT},
    QueryParams,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{json, negotiate_media, spreadsheet};
use super::{ApiResult, AppState};

const HOSTS_MEDIA: &[MediaType] = &[
    MediaType::Json,
    MediaType::Xlsx,
    MediaType::LmsXlsx,
    MediaType::ExtendedJson,
];

const HOST_MEDIA: &[MediaType] = &[MediaType::Json, MediaType::ExtendedJson];

pub async fn search_hosts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let media = negotiate_media(&headers, HOSTS_MEDIA);
    let filter = HostsFilter::parse(&QueryParams::from(query))?;
    let service = &state.service;

    match media {
        MediaType::Xlsx => {
            let filter = HostsFilter {
                mode: HostsMode::Summary,
                report: filter.report.unpaged(),
                ..filter
            };
            let hosts = service.search_hosts(&filter).await?.into_items();
            spreadsheet(&state, "hosts", &HOSTS_LAYOUT, media, &hosts)
        }
        MediaType::LmsXlsx => {
            let rows = service.search_hosts_lms(&filter).await?;
            spreadsheet(&state, "lms", &LMS_LAYOUT, media, &rows)
        }
        MediaType::ExtendedJson => {
            let documents = service.search_host_documents(&filter).await?;
            Ok(json(&documents.map(|doc| doc.to_extended_json())))
        }
        MediaType::Json => match filter.mode {
            HostsMode::Full | HostsMode::Summary => Ok(json(&service.search_hosts(&filter).await?)),
            HostsMode::Lms => Ok(json(&service.search_hosts_lms(&filter).await?)),
            HostsMode::Mhd => Ok(json(&service.search_host_documents(&filter).await?)),
        },
    }
}

pub async fn get_host(
    State(state): State<Arc<AppState>>,
    Path(hostname): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let media = negotiate_media(&headers, HOST_MEDIA);
    let older_than = QueryParams::from(query).time("older-than")?;
    let host: HostDocument = state.service.get_host(&hostname, older_than).await?;

    Ok(match media {
        MediaType::ExtendedJson => json(&host.to_extended_json()),
        _ => json(&host),
    })
}

pub async fn archive_host(
    State(state): State<Arc<AppState>>,
    Path(hostname): Path<String>,
) -> ApiResult<Response> {
    state.service.archive_host(&hostname).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let filter = GlobalFilter::parse(&QueryParams::from(query))?;
    Ok(json(&state.service.list_locations(&filter).await?))
}

pub async fn list_environments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let filter = GlobalFilter::parse(&QueryParams::from(query))?;
    Ok(json(&state.service.list_environments(&filter).await?))
}
