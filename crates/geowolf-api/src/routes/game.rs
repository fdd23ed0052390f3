//! Game-level queries: win progress, overall status, lobby gate.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use geowolf_game::{GameOutcome, WinState};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /game/progress
///
/// Either a finished outcome `{winner, reason}` or a progress snapshot
/// `{completedTasks, requiredTasks, tasksRemaining, aliveVillagers,
/// aliveSaboteurs}`.
async fn progress(State(state): State<AppState>) -> Result<Json<WinState>, ApiError> {
    Ok(Json(state.session.evaluate_progress().await?))
}

/// Response body for GET /game/status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
    pub meeting_active: bool,
    pub player_count: usize,
}

/// GET /game/status
async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let outcome = match state.session.evaluate_progress().await? {
        WinState::Ended(outcome) => Some(outcome),
        WinState::Ongoing(_) => None,
    };
    let meeting_active = state.session.meeting_status().await?.active;
    let player_count = state.session.store().all_players().await?.len();
    Ok(Json(StatusResponse {
        ended: outcome.is_some(),
        outcome,
        meeting_active,
        player_count,
    }))
}

/// Response body for GET /game/lobby.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyResponse {
    pub ready: bool,
    pub player_count: usize,
    pub threshold: usize,
}

/// GET /game/lobby
async fn lobby(State(state): State<AppState>) -> Result<Json<LobbyResponse>, ApiError> {
    let player_count = state.session.store().all_players().await?.len();
    Ok(Json(LobbyResponse {
        ready: player_count >= state.player_threshold,
        player_count,
        threshold: state.player_threshold,
    }))
}

/// Returns the router for game-level queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress", get(progress))
        .route("/status", get(status))
        .route("/lobby", get(lobby))
}
