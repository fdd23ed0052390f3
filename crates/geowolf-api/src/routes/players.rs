//! Player registration, roster, and live-state updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post, routing::put};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use geowolf_core::geo::Position;
use geowolf_core::model::Player;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /players.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub device_id: String,
    pub name: String,
    pub color: String,
}

/// Response body for POST /players.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub player_id: i64,
    /// Tasks assigned with the registration; empty on re-registration.
    pub task_ids: Vec<i64>,
}

/// POST /players
#[instrument(skip(state, request), fields(device_id = %request.device_id))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let (player_id, task_ids) = state
        .session
        .register_player(&request.device_id, &request.name, &request.color)
        .await?;
    info!(player_id, "player registered");
    Ok(Json(RegisterResponse {
        player_id,
        task_ids,
    }))
}

/// GET /players
async fn roster(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    Ok(Json(state.session.roster().await?))
}

/// Query parameters for GET /players/nearby.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    /// Radius in meters; absent means unbounded.
    pub radius: Option<f64>,
}

/// GET /players/nearby
async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let origin = Position {
        lat: query.lat,
        lng: query.lng,
    };
    Ok(Json(state.session.nearby_players(origin, query.radius).await?))
}

/// GET /players/{deviceId}
async fn player(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    Ok(Json(state.session.player(&device_id).await?))
}

/// Response body for GET /players/{deviceId}/exists.
#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// GET /players/{deviceId}/exists
async fn exists(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = state.session.store().device_registered(&device_id).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Request body for PUT /players/{deviceId}/position.
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub lat: f64,
    pub lng: f64,
}

/// PUT /players/{deviceId}/position
async fn update_position(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> Result<StatusCode, ApiError> {
    let position = Position {
        lat: request.lat,
        lng: request.lng,
    };
    state.session.update_position(&device_id, position).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for PUT /players/{deviceId}/angle.
#[derive(Debug, Deserialize)]
pub struct AngleRequest {
    pub angle: f64,
}

/// PUT /players/{deviceId}/angle
async fn update_angle(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<AngleRequest>,
) -> Result<StatusCode, ApiError> {
    state.session.update_angle(&device_id, request.angle).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for PUT /players/{deviceId}/alive.
#[derive(Debug, Deserialize)]
pub struct AliveRequest {
    pub alive: bool,
}

/// PUT /players/{deviceId}/alive
#[instrument(skip(state, request), fields(alive = request.alive))]
async fn update_alive(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<AliveRequest>,
) -> Result<StatusCode, ApiError> {
    state.session.set_alive(&device_id, request.alive).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for player endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(roster))
        .route("/nearby", get(nearby))
        .route("/{device_id}", get(player))
        .route("/{device_id}/exists", get(exists))
        .route("/{device_id}/position", put(update_position))
        .route("/{device_id}/angle", put(update_angle))
        .route("/{device_id}/alive", put(update_alive))
}
