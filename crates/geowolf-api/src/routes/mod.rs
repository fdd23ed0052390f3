//! Route modules organized by game concern.

use axum::Router;

use crate::state::AppState;
use crate::ws;

pub mod game;
pub mod health;
pub mod meetings;
pub mod messages;
pub mod missions;
pub mod players;
pub mod reports;
pub mod tasks;
pub mod votes;

/// The full application router. `main` and the integration tests build the
/// same tree from here.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(ws::router())
        .nest("/players", players::router())
        .nest("/missions", missions::router())
        .nest("/tasks", tasks::router())
        .nest("/messages", messages::router())
        .nest("/votes", votes::router())
        .nest("/reports", reports::router())
        .nest("/meetings", meetings::router())
        .nest("/game", game::router())
}
