//! Saboteur kill validation and covert notification.

use geowolf_core::error::GameError;
use geowolf_core::model::Role;

use crate::broadcast::ServerEvent;
use crate::session::GameSession;

impl GameSession {
    /// Validate and apply a saboteur kill. Checks run in a fixed order so
    /// the caller gets the most specific rejection: unknown killer, killer
    /// not a saboteur, unknown target, self-target, target not a villager,
    /// target already dead, meeting in progress.
    ///
    /// On success the victim is marked dead, a body is recorded at the
    /// victim's last position, and only the victim (`killed`) and the
    /// killer (`kill_success`) are notified. Everyone else learns of the
    /// death from the kill logs at the next meeting. Returns the victim's
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`], [`GameError::Forbidden`],
    /// [`GameError::Validation`], or [`GameError::Conflict`] per the
    /// ordered checks above.
    pub async fn attempt_kill(
        &self,
        killer_device_id: &str,
        target_device_id: &str,
    ) -> Result<String, GameError> {
        let killer = self.store().require_player(killer_device_id).await?;
        if killer.role != Role::Saboteur {
            return Err(GameError::Forbidden(
                "only a saboteur can kill".to_string(),
            ));
        }
        let target = self.store().require_player(target_device_id).await?;
        if killer.id == target.id {
            return Err(GameError::Validation(
                "cannot target yourself".to_string(),
            ));
        }
        if target.role != Role::Villager {
            return Err(GameError::Forbidden(
                "target is not a villager".to_string(),
            ));
        }
        if !target.alive {
            return Err(GameError::Conflict("target is already dead".to_string()));
        }
        if self.store().meeting_state().await?.active {
            return Err(GameError::Conflict(
                "cannot kill during a meeting".to_string(),
            ));
        }

        // The conditional update is the only writer that flips alive to 0,
        // so a concurrent duplicate kill loses the race and records nothing.
        if !self.store().mark_dead(&target.device_id).await? {
            return Err(GameError::Conflict("target is already dead".to_string()));
        }
        if let Err(err) = self.store().insert_body(&target, Some(&killer)).await {
            tracing::warn!(%err, victim = %target.name, "body record failed after kill");
        }

        self.broadcaster().send_to(
            &target.device_id,
            &ServerEvent::Killed {
                message: "you were killed".to_string(),
            },
        );
        self.broadcaster().send_to(
            &killer.device_id,
            &ServerEvent::KillSuccess {
                message: format!("{} was killed", target.name),
            },
        );
        tracing::info!(killer = %killer.name, victim = %target.name, "kill applied");
        Ok(target.name)
    }
}
