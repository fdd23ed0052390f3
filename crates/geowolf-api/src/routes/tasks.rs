//! Task assignment, completion, and removal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::patch, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use geowolf_core::model::Task;
use geowolf_game::AssignReason;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /tasks/{deviceId}.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// Operator-visible hint; no scheduling effect.
    pub priority: Option<String>,
    pub reason: Option<AssignReason>,
}

/// Response body for POST /tasks/{deviceId}.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    pub task_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// POST /tasks/{deviceId}
#[instrument(skip(state, request, device_id), fields(device_id = %device_id))]
async fn assign(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    let reason = request.reason.unwrap_or(AssignReason::Normal);
    let task_ids = state.session.assign_tasks(&device_id, reason).await?;
    info!(count = task_ids.len(), "tasks assigned");
    Ok(Json(AssignResponse {
        task_ids,
        priority: request.priority,
    }))
}

/// GET /tasks/{deviceId}
async fn list(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.session.tasks_for(&device_id).await?))
}

/// Request body for PATCH /tasks/{id}/done.
#[derive(Debug, Deserialize)]
pub struct DoneRequest {
    pub done: bool,
    /// Scanned completion code; required when `done` is true.
    pub code: Option<String>,
}

/// PATCH /tasks/{id}/done
#[instrument(skip(state, request, task_id), fields(task_id, done = request.done))]
async fn set_done(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(request): Json<DoneRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .session
        .complete_task(task_id, request.done, request.code.as_deref())
        .await?;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
async fn remove(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.session.remove_task(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for task endpoints. The path parameter is a device
/// id for assignment and listing, and a task id for completion and removal.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", post(assign).get(list).delete(remove))
        .route("/{id}/done", patch(set_done))
}
