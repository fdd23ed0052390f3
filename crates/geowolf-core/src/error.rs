//! Domain error types.

use thiserror::Error;

/// Top-level game error type.
///
/// Expected business outcomes ("player not found", "already voted") are
/// values of this enum, never string-matched exceptions. HTTP handlers map
/// the variants to 404/400/409/403/500; realtime handlers map them to typed
/// `*_error` events sent to the acting client only.
#[derive(Debug, Error)]
pub enum GameError {
    /// A referenced player or task does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed or missing required field.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current game state (duplicate vote for
    /// the same target, kill during an active meeting, double mission
    /// assignment).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The acting player lacks the role required for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl GameError {
    /// Wrap any displayable persistence failure.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Stable machine-readable code for the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::Storage(_) => "storage_error",
        }
    }
}
