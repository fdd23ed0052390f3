//! Player persistence.

use geowolf_core::error::GameError;
use geowolf_core::geo::Position;
use geowolf_core::model::{Player, Role};

use crate::rows::PlayerRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Register a player, or return the existing id if the device is
    /// already known. New players start as living villagers at the origin
    /// coordinate. Returns `(player_id, created)`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn create_player(
        &self,
        device_id: &str,
        name: &str,
        color: &str,
    ) -> Result<(i64, bool), GameError> {
        if let Some(existing) = self.player_by_device(device_id).await? {
            return Ok((existing.id, false));
        }
        let result = sqlx::query(
            "INSERT INTO players (device_id, name, position, role, color) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(device_id)
        .bind(name)
        .bind(Position::default().to_json())
        .bind(Role::Villager.as_str())
        .bind(color)
        .execute(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok((result.last_insert_rowid(), true))
    }

    /// Look up a player by device identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn player_by_device(&self, device_id: &str) -> Result<Option<Player>, GameError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, device_id, name, position, role, alive, color, angle
             FROM players WHERE device_id = ? LIMIT 1",
        )
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(row.map(Player::from))
    }

    /// Look up a player by device identifier, or fail with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if the device is unknown.
    pub async fn require_player(&self, device_id: &str) -> Result<Player, GameError> {
        self.player_by_device(device_id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("player {device_id}")))
    }

    /// Look up a player by row id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn player_by_id(&self, id: i64) -> Result<Option<Player>, GameError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, device_id, name, position, role, alive, color, angle
             FROM players WHERE id = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(row.map(Player::from))
    }

    /// The full roster, registration order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn all_players(&self) -> Result<Vec<Player>, GameError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, device_id, name, position, role, alive, color, angle
             FROM players ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    /// Whether the device has a registered player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn device_registered(&self, device_id: &str) -> Result<bool, GameError> {
        Ok(self.player_by_device(device_id).await?.is_some())
    }

    /// Update a player's position. Returns false if the device is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn update_position(
        &self,
        device_id: &str,
        position: Position,
    ) -> Result<bool, GameError> {
        let result = sqlx::query("UPDATE players SET position = ? WHERE device_id = ?")
            .bind(position.to_json())
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Update a player's compass heading. Returns false if the device is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Validation`] if the angle is outside `[0, 360)`.
    pub async fn update_angle(&self, device_id: &str, angle: f64) -> Result<bool, GameError> {
        if !(0.0..360.0).contains(&angle) {
            return Err(GameError::Validation(format!(
                "angle {angle} outside [0, 360)"
            )));
        }
        let result = sqlx::query("UPDATE players SET angle = ? WHERE device_id = ?")
            .bind(angle)
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip a living player to dead. The conditional predicate makes this
    /// the single alive→dead transition point: callers create exactly one
    /// Body when (and only when) this returns true.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn mark_dead(&self, device_id: &str) -> Result<bool, GameError> {
        let result = sqlx::query("UPDATE players SET alive = 0 WHERE device_id = ? AND alive = 1")
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a player back to alive. Returns false if the device is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn revive(&self, device_id: &str) -> Result<bool, GameError> {
        let result = sqlx::query("UPDATE players SET alive = 1 WHERE device_id = ?")
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a player's role.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn set_role(&self, device_id: &str, role: Role) -> Result<bool, GameError> {
        let result = sqlx::query("UPDATE players SET role = ? WHERE device_id = ?")
            .bind(role.as_str())
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a player entirely; tasks, messages, votes, and reports
    /// referencing it cascade per the schema.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn delete_player(&self, device_id: &str) -> Result<bool, GameError> {
        let result = sqlx::query("DELETE FROM players WHERE device_id = ?")
            .bind(device_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }
}
