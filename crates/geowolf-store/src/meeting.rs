//! The singleton meeting row.
//!
//! Activation and deactivation are conditional updates; the affected-row
//! count is the process-wide guard that at most one meeting is active and
//! that resolution runs exactly once even when the duration timer and a
//! manual end interleave.

use chrono::{DateTime, Utc};

use geowolf_core::error::GameError;
use geowolf_core::model::{MeetingState, MeetingTrigger};

use crate::rows::MeetingRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Activate the meeting row. Returns false (a no-op, not an error) if a
    /// meeting is already active; the existing meeting is not extended or
    /// restarted.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn activate_meeting(
        &self,
        start_time: DateTime<Utc>,
        duration_secs: i64,
        trigger: MeetingTrigger,
    ) -> Result<bool, GameError> {
        let result = sqlx::query(
            "UPDATE meeting_state
             SET active = 1, start_time = ?, duration_secs = ?, trigger_kind = ?
             WHERE id = 1 AND active = 0",
        )
        .bind(start_time)
        .bind(duration_secs)
        .bind(trigger.as_str())
        .execute(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate the meeting row. Returns false if no meeting was active;
    /// exactly one caller observes the true result per meeting.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn deactivate_meeting(&self) -> Result<bool, GameError> {
        let result = sqlx::query(
            "UPDATE meeting_state
             SET active = 0, start_time = NULL, trigger_kind = NULL
             WHERE id = 1 AND active = 1",
        )
        .execute(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    /// Current meeting state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn meeting_state(&self) -> Result<MeetingState, GameError> {
        let row = sqlx::query_as::<_, MeetingRow>(
            "SELECT active, start_time, duration_secs, trigger_kind FROM meeting_state WHERE id = 1",
        )
        .fetch_one(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(MeetingState::from(row))
    }
}
