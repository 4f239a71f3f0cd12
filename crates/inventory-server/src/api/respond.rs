//! Response shaping shared by the report handlers

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use inventory_lib::{
    models::Caller,
    render::{build_workbook, negotiate, MediaType, SheetLayout, SheetRow},
    InventoryError,
};
use serde::{de::DeserializeOwned, Serialize};

use super::{ApiError, ApiResult, AppState};

/// Media types of the plain tabular reports
pub const REPORT_MEDIA: &[MediaType] = &[MediaType::Json, MediaType::Xlsx];

/// Picks the response format from the request's `Accept` header
pub fn negotiate_media(headers: &HeaderMap, offered: &[MediaType]) -> MediaType {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    negotiate(accept, offered)
}

pub fn json<T: Serialize>(value: &T) -> Response {
    Json(value).into_response()
}

pub fn json_with_status<T: Serialize>(status: StatusCode, value: &T) -> Response {
    (status, Json(value)).into_response()
}

/// Renders `rows` as a workbook attachment named after `report`
pub fn spreadsheet<R: SheetRow>(
    state: &AppState,
    report: &str,
    layout: &SheetLayout,
    media: MediaType,
    rows: &[R],
) -> ApiResult<Response> {
    let bytes = build_workbook(layout, rows).map_err(InventoryError::from)?;
    state.metrics.add_exported_rows(report, rows.len());
    state
        .logger
        .log_export(report, media.mime(), rows.len(), bytes.len());

    let disposition = format!("attachment; filename=\"{report}.xlsx\"");
    Ok((
        [
            (header::CONTENT_TYPE, media.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Decodes a JSON request body, answering 400 when it does not fit `T`
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(ApiError::malformed_body)
}

pub fn caller(extension: &Option<axum::Extension<Caller>>) -> Option<&Caller> {
    extension.as_ref().map(|axum::Extension(caller)| caller)
}
