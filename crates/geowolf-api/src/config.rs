//! Startup configuration from environment variables.

use crate::error::AppError;

/// Server configuration read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// SQLite database URL, e.g. `sqlite://geowolf.db`.
    pub database_url: String,
    /// Path to the mission catalog JSON file.
    pub missions_path: String,
    /// Player count at which the lobby reports ready.
    pub player_threshold: usize,
}

impl AppConfig {
    /// Read configuration from the environment. Parse failures are startup
    /// errors; the process must not come up half-configured.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for a missing `DATABASE_URL` or an
    /// unparseable numeric variable.
    pub fn from_env() -> Result<Self, AppError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
        let missions_path =
            std::env::var("MISSIONS_PATH").unwrap_or_else(|_| "missions.json".to_string());
        let player_threshold: usize = std::env::var("PLAYER_THRESHOLD")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PLAYER_THRESHOLD must be a number: {e}")))?;
        Ok(Self {
            host,
            port,
            database_url,
            missions_path,
            player_threshold,
        })
    }
}
