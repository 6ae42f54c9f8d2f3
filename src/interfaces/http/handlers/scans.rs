//! Scan ingestion and listing endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::ScanService;
use crate::domain::{NewScan, ScanEvent, DEFAULT_LIST_LIMIT};
use crate::interfaces::http::common::{ApiError, ApiResponse};

/// Scan handler state
#[derive(Clone)]
pub struct ScanState {
    pub service: Arc<ScanService>,
}

/// Listing parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListScansParams {
    /// Number of scans to return (1-500). Default: 50
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// Ingest a scan reported by a reader
///
/// Persists the scan and pushes the stored record to every live subscriber.
#[utoipa::path(
    post,
    path = "/api/scans",
    tag = "Scans",
    request_body = NewScan,
    responses(
        (status = 201, description = "Scan stored and broadcast", body = ScanEvent),
        (status = 400, description = "Missing or empty uid, or malformed body", body = ApiResponse<String>),
        (status = 500, description = "Store unavailable", body = ApiResponse<String>)
    )
)]
pub async fn create_scan(
    State(state): State<ScanState>,
    payload: Result<Json<NewScan>, JsonRejection>,
) -> Result<(StatusCode, Json<ScanEvent>), ApiError> {
    let Json(scan) = payload?;
    let stored = state.service.submit(scan).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Most recent scans, newest first
#[utoipa::path(
    get,
    path = "/api/scans",
    tag = "Scans",
    params(ListScansParams),
    responses(
        (status = 200, description = "Scans ordered by timestamp descending", body = Vec<ScanEvent>),
        (status = 400, description = "limit outside 1-500 or not an integer", body = ApiResponse<String>)
    )
)]
pub async fn list_scans(
    State(state): State<ScanState>,
    params: Result<Query<ListScansParams>, QueryRejection>,
) -> Result<Json<Vec<ScanEvent>>, ApiError> {
    let Query(params) = params?;
    let scans = state.service.list(params.limit).await?;
    Ok(Json(scans))
}

#[utoipa::path(
    get,
    path = "/api/scans/{id}",
    tag = "Scans",
    params(("id" = String, Path, description = "Scan identifier")),
    responses(
        (status = 200, description = "Stored scan", body = ScanEvent),
        (status = 404, description = "Not found", body = ApiResponse<String>)
    )
)]
pub async fn get_scan(
    State(state): State<ScanState>,
    Path(id): Path<String>,
) -> Result<Json<ScanEvent>, ApiError> {
    Ok(Json(state.service.get(&id).await?))
}
