//! Meeting control endpoints.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use geowolf_core::model::{MeetingState, MeetingTrigger};
use geowolf_game::{ExecutedPlayer, GameOutcome};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /meetings/start.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub duration_minutes: i64,
    pub trigger: Option<MeetingTrigger>,
}

/// Response body for POST /meetings/start.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    /// False when a meeting was already running (a no-op, not an error).
    pub started: bool,
}

/// POST /meetings/start
#[instrument(skip(state, request), fields(duration_minutes = request.duration_minutes))]
async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, ApiError> {
    let trigger = request.trigger.unwrap_or(MeetingTrigger::Manual);
    let started = state
        .session
        .start_meeting(request.duration_minutes * 60, trigger)
        .await?;
    Ok(Json(StartResponse { started }))
}

/// Response body for POST /meetings/end.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndResponse {
    /// False when no meeting was active.
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed: Option<ExecutedPlayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_ended: Option<GameOutcome>,
}

/// POST /meetings/end
#[instrument(skip(state))]
async fn end(State(state): State<AppState>) -> Result<Json<EndResponse>, ApiError> {
    let response = match state.session.end_meeting().await? {
        Some(outcome) => EndResponse {
            resolved: true,
            executed: outcome.executed,
            game_ended: outcome.game_ended,
        },
        None => EndResponse {
            resolved: false,
            executed: None,
            game_ended: None,
        },
    };
    Ok(Json(response))
}

/// GET /meetings/status
async fn status(State(state): State<AppState>) -> Result<Json<MeetingState>, ApiError> {
    Ok(Json(state.session.meeting_status().await?))
}

/// Returns the router for meeting endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/end", post(end))
        .route("/status", get(status))
}
