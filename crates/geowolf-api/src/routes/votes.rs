//! Vote casting and tally queries.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use geowolf_core::model::{VoteAction, VoteCount, VoteStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /votes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub device_id: String,
    pub target_device_id: String,
}

/// Response body for POST /votes.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub action: VoteAction,
    pub message: String,
}

/// POST /votes
#[instrument(skip(state, request), fields(device_id = %request.device_id))]
async fn cast(
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let action = state
        .session
        .cast_vote(&request.device_id, &request.target_device_id)
        .await?;
    let message = match action {
        VoteAction::Created => "vote recorded".to_string(),
        VoteAction::Updated => "vote changed".to_string(),
    };
    Ok(Json(VoteResponse { action, message }))
}

/// GET /votes/status/{deviceId}
async fn status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<VoteStatus>, ApiError> {
    let voter = state.session.store().require_player(&device_id).await?;
    Ok(Json(state.session.store().vote_status(voter.id).await?))
}

/// GET /votes/counts
async fn counts(State(state): State<AppState>) -> Result<Json<Vec<VoteCount>>, ApiError> {
    Ok(Json(state.session.store().vote_counts().await?))
}

/// Returns the router for vote endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(cast))
        .route("/status/{device_id}", get(status))
        .route("/counts", get(counts))
}
