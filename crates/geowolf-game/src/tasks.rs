//! Task lifecycle: assignment, proof-gated completion, deadline expiry.

use geowolf_core::error::GameError;
use geowolf_core::model::{Mission, Task};
use serde::{Deserialize, Serialize};

use crate::session::GameSession;

/// Why a batch is being assigned. `TimeExpired` batches are singletons and
/// are excluded from duration heuristics on the operator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignReason {
    Normal,
    TimeExpired,
}

impl GameSession {
    /// Assign missions to a player: three for a fresh batch, one for an
    /// expiry replacement. Selection is uniform random over the catalog
    /// minus missions already assigned to that player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device and
    /// [`GameError::Validation`] when no eligible mission remains.
    pub async fn assign_tasks(
        &self,
        device_id: &str,
        reason: AssignReason,
    ) -> Result<Vec<i64>, GameError> {
        let player = self.store().require_player(device_id).await?;
        let count = match reason {
            AssignReason::Normal => self.config().fresh_task_count,
            AssignReason::TimeExpired => self.config().replacement_task_count,
        };
        let assigned = self.store().assigned_mission_ids(player.id).await?;
        let mut eligible: Vec<&Mission> = self
            .catalog()
            .iter()
            .filter(|m| !assigned.contains(&m.id))
            .collect();
        if eligible.is_empty() {
            return Err(GameError::Validation(format!(
                "no eligible missions for player {device_id}"
            )));
        }
        let deadline = self.now() + self.config().task_deadline;
        let mut task_ids = Vec::with_capacity(count);
        for _ in 0..count {
            if eligible.is_empty() {
                break;
            }
            let mission = eligible.swap_remove(self.pick(eligible.len()));
            let task_id = self.store().insert_task(player.id, mission, deadline).await?;
            task_ids.push(task_id);
        }
        tracing::info!(device_id, ?reason, count = task_ids.len(), "tasks assigned");
        Ok(task_ids)
    }

    /// All tasks currently held by a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device.
    pub async fn tasks_for(&self, device_id: &str) -> Result<Vec<Task>, GameError> {
        let player = self.store().require_player(device_id).await?;
        self.store().tasks_for_player(player.id).await
    }

    /// Set a task's done flag. Completion is not self-declared: marking a
    /// task done requires a scanned code equal to the mission id. Marking
    /// an already-done task done again is a no-op on success.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown task and
    /// [`GameError::Validation`] for a missing or mismatched code.
    pub async fn complete_task(
        &self,
        task_id: i64,
        done: bool,
        code: Option<&str>,
    ) -> Result<Task, GameError> {
        let mut task = self
            .store()
            .task_by_id(task_id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("task {task_id}")))?;
        if !done {
            self.store().set_task_done(task_id, false).await?;
            task.done = false;
            return Ok(task);
        }
        if task.done {
            return Ok(task);
        }
        let code = code.ok_or_else(|| {
            GameError::Validation("completion requires a scanned code".to_string())
        })?;
        if code != task.mission_id.to_string() {
            return Err(GameError::Validation(format!(
                "scanned code does not match mission {}",
                task.mission_id
            )));
        }
        self.store().set_task_done(task_id, true).await?;
        task.done = true;
        tracing::info!(task_id, mission_id = task.mission_id, "task completed");
        Ok(task)
    }

    /// Delete a task outright.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown task.
    pub async fn remove_task(&self, task_id: i64) -> Result<(), GameError> {
        if self.store().delete_task(task_id).await? {
            Ok(())
        } else {
            Err(GameError::NotFound(format!("task {task_id}")))
        }
    }

    /// Expire overdue tasks: each unfinished task past its deadline is
    /// deleted and exactly one replacement is assigned, tagged
    /// `time_expired`. Returns how many tasks expired.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn expire_due_tasks(&self) -> Result<usize, GameError> {
        let expired = self.store().expired_tasks(self.now()).await?;
        for task in &expired {
            self.store().delete_task(task.id).await?;
            let Some(player) = self.store().player_by_id(task.player_id).await? else {
                continue;
            };
            match self
                .assign_tasks(&player.device_id, AssignReason::TimeExpired)
                .await
            {
                Ok(replacement) => {
                    tracing::info!(
                        task_id = task.id,
                        device_id = %player.device_id,
                        ?replacement,
                        "expired task replaced"
                    );
                }
                // Catalog exhausted for this player; nothing to replace with.
                Err(GameError::Validation(reason)) => {
                    tracing::warn!(task_id = task.id, %reason, "expired task not replaced");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(expired.len())
    }
}
