//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use geowolf_core::error::GameError;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Mission catalog could not be read or parsed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Store open or migration error.
    #[error("store error: {0}")]
    Store(#[from] GameError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `GameError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::Conflict(_) => StatusCode::CONFLICT,
            GameError::Forbidden(_) => StatusCode::FORBIDDEN,
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
