use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use inventory_lib::{
    filter::ClustersFilter,
    render::{MediaType, CLUSTERS_LAYOUT, CLUSTER_VMS_LAYOUT},
    QueryParams,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::respond::{json, negotiate_media, spreadsheet, REPORT_MEDIA};
use super::{ApiResult, AppState};

pub async fn search_clusters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let mut filter = ClustersFilter::parse(&QueryParams::from(query))?;
    let media = negotiate_media(&headers, REPORT_MEDIA);

    if media == MediaType::Xlsx {
        filter.report = filter.report.unpaged();
        let clusters = state.service.search_clusters(&filter).await?.into_items();
        return spreadsheet(&state, "clusters", &CLUSTERS_LAYOUT, media, &clusters);
    }

    Ok(json(&state.service.search_clusters(&filter).await?))
}

/// One cluster, or its VM list as a workbook
pub async fn get_cluster(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let older_than = QueryParams::from(query).time("older-than")?;
    let media = negotiate_media(&headers, REPORT_MEDIA);
    let cluster = state.service.get_cluster(&name, older_than).await?;

    match media {
        MediaType::Xlsx => spreadsheet(&state, "cluster_vms", &CLUSTER_VMS_LAYOUT, media, &cluster.vms),
        _ => Ok(json(&cluster)),
    }
}
