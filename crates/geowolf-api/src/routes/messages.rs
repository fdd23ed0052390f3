//! Proximity-gated chat over HTTP.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use geowolf_core::model::Message;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /messages/{deviceId}.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub content: String,
    /// Radius override in meters; absent uses the configured default.
    pub radius: Option<f64>,
}

/// Response body for POST /messages/{deviceId}.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub message_id: i64,
}

/// POST /messages/{deviceId}
#[instrument(skip(state, request, device_id), fields(device_id = %device_id))]
async fn send(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let message_id = state
        .session
        .send_chat(&device_id, &request.content, request.radius)
        .await?;
    Ok(Json(SendResponse { message_id }))
}

/// GET /messages/{deviceId}
async fn history(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.session.messages_for(&device_id).await?))
}

/// Returns the router for message endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/{device_id}", post(send).get(history))
}
