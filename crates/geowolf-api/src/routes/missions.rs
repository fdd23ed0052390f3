//! The immutable mission catalog.

use axum::extract::State;
use axum::{Json, Router, routing::get};

use geowolf_core::model::Mission;

use crate::state::AppState;

/// GET /missions
async fn catalog(State(state): State<AppState>) -> Json<Vec<Mission>> {
    Json(state.session.catalog().to_vec())
}

/// Returns the router for the mission catalog.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(catalog))
}
