//! Report filing and history.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use geowolf_core::model::Report;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /reports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub device_id: String,
    pub reported_device_id: Option<String>,
}

/// Response body for POST /reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_id: i64,
}

/// POST /reports
#[instrument(skip(state, request), fields(device_id = %request.device_id))]
async fn file(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report_id = state
        .session
        .submit_report(&request.device_id, request.reported_device_id.as_deref())
        .await?;
    Ok(Json(ReportResponse { report_id }))
}

/// GET /reports
async fn history(State(state): State<AppState>) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(state.session.store().all_reports().await?))
}

/// Returns the router for report endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(file).get(history))
}
