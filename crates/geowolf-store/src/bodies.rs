//! Body persistence. One record per death, immutable thereafter.

use geowolf_core::error::GameError;
use geowolf_core::model::{Body, Player};

use crate::rows::BodyRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Record a death at the victim's current position. `killer` is absent
    /// for deaths by the crowd or the generic death path.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn insert_body(
        &self,
        victim: &Player,
        killer: Option<&Player>,
    ) -> Result<i64, GameError> {
        let result = sqlx::query(
            "INSERT INTO bodies (victim_id, victim_name, killer_id, killer_name, death_position)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(victim.id)
        .bind(&victim.name)
        .bind(killer.map(|k| k.id))
        .bind(killer.map(|k| k.name.as_str()))
        .bind(victim.position.to_json())
        .execute(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(result.last_insert_rowid())
    }

    /// Every recorded death, newest first. Rendered as kill logs at the
    /// next meeting start.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn all_bodies(&self) -> Result<Vec<Body>, GameError> {
        let rows = sqlx::query_as::<_, BodyRow>(
            "SELECT id, victim_id, victim_name, killer_id, killer_name, death_position, death_time
             FROM bodies ORDER BY death_time DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Body::from).collect())
    }
}
