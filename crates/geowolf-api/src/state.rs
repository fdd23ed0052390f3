//! Shared application state.

use std::sync::Arc;

use geowolf_game::GameSession;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The running game session.
    pub session: Arc<GameSession>,
    /// Player count at which the lobby reports ready.
    pub player_threshold: usize,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(session: Arc<GameSession>, player_threshold: usize) -> Self {
        Self {
            session,
            player_threshold,
        }
    }
}
