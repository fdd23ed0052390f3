//! Store handle and connection management.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use geowolf_core::error::GameError;

/// SQLite-backed record of players, tasks, messages, votes, reports, bodies,
/// and the singleton meeting row.
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Wrap an existing pool (used by tests, which manage their own pools).
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `url`, creating the file if missing, and apply
    /// migrations. A failure here is fatal to the caller: the process must
    /// not accept connections without a store.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] if the database cannot be opened or
    /// migrated.
    pub async fn connect(url: &str) -> Result<Self, GameError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(GameError::storage)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(GameError::storage)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GameError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(GameError::storage)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
