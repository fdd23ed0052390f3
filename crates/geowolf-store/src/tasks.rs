//! Task persistence.

use chrono::{DateTime, Utc};

use geowolf_core::error::GameError;
use geowolf_core::model::{Mission, Task, TaskStats};

use crate::rows::TaskRow;
use crate::store::SessionStore;

const TASK_COLUMNS: &str = "id, player_id, mission_id, position, done, content, place, deadline";

impl SessionStore {
    /// Instantiate a mission for a player with the given deadline.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Conflict`] if the player already holds a task
    /// for this mission (uniqueness on `(player, mission)`).
    pub async fn insert_task(
        &self,
        player_id: i64,
        mission: &Mission,
        deadline: DateTime<Utc>,
    ) -> Result<i64, GameError> {
        let result = sqlx::query(
            "INSERT INTO tasks (player_id, mission_id, position, done, content, place, deadline)
             VALUES (?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(player_id)
        .bind(mission.id)
        .bind(mission.position.to_json())
        .bind(&mission.name)
        .bind(&mission.place)
        .bind(deadline)
        .execute(self.pool())
        .await;
        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(GameError::Conflict(format!(
                    "mission {} already assigned to player {player_id}",
                    mission.id
                )))
            }
            Err(err) => Err(GameError::storage(err)),
        }
    }

    /// Mission ids already instantiated for a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn assigned_mission_ids(&self, player_id: i64) -> Result<Vec<i64>, GameError> {
        sqlx::query_scalar("SELECT mission_id FROM tasks WHERE player_id = ?")
            .bind(player_id)
            .fetch_all(self.pool())
            .await
            .map_err(GameError::storage)
    }

    /// All tasks held by a player, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn tasks_for_player(&self, player_id: i64) -> Result<Vec<Task>, GameError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE player_id = ? ORDER BY id"
        ))
        .bind(player_id)
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Look up a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn task_by_id(&self, id: i64) -> Result<Option<Task>, GameError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(row.map(Task::from))
    }

    /// Set the done flag. Returns false if the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn set_task_done(&self, id: i64, done: bool) -> Result<bool, GameError> {
        let result = sqlx::query("UPDATE tasks SET done = ? WHERE id = ?")
            .bind(done)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a task. Returns false if the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn delete_task(&self, id: i64) -> Result<bool, GameError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Unfinished tasks whose deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn expired_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>, GameError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE done = 0 AND deadline <= ?"
        ))
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Task counts for win evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn task_stats(&self) -> Result<TaskStats, GameError> {
        let (total_tasks, completed_tasks, villager_tasks, completed_villager_tasks) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                "SELECT
                   (SELECT COUNT(*) FROM tasks),
                   (SELECT COUNT(*) FROM tasks WHERE done = 1),
                   (SELECT COUNT(*) FROM tasks t JOIN players p ON t.player_id = p.id
                     WHERE p.role = 'villager'),
                   (SELECT COUNT(*) FROM tasks t JOIN players p ON t.player_id = p.id
                     WHERE p.role = 'villager' AND t.done = 1)",
            )
            .fetch_one(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(TaskStats {
            total_tasks,
            completed_tasks,
            villager_tasks,
            completed_villager_tasks,
        })
    }
}
