//! Meeting state machine, vote collection, and resolution.
//!
//! The singleton meeting row in the store is the source of truth; its
//! conditional activate/deactivate updates are the guards that at most one
//! meeting is active and that resolution runs exactly once. The duration
//! timer and a manual end both funnel into [`GameSession::resolve_meeting`];
//! a manual end aborts the pending timer first, and the timer task drops its
//! own handle without aborting so resolution is never cancelled mid-flight.

use std::sync::PoisonError;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use geowolf_core::error::GameError;
use geowolf_core::model::{MeetingState, MeetingTrigger, VoteAction};

use crate::broadcast::ServerEvent;
use crate::session::GameSession;
use crate::win::{GameOutcome, WinState};

/// One line of the kill log shown when a meeting opens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillLog {
    pub victim_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer_name: Option<String>,
    pub death_time: DateTime<Utc>,
}

/// The player executed by vote, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedPlayer {
    pub name: String,
    pub device_id: String,
}

/// Result of one meeting resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingOutcome {
    pub executed: Option<ExecutedPlayer>,
    pub game_ended: Option<GameOutcome>,
}

impl GameSession {
    /// Open a meeting. Starting while one is already active is an
    /// idempotent no-op (`Ok(false)`): the existing meeting is not extended
    /// or restarted. On a real start, all connected clients receive
    /// `meetingStarted` with the kill logs, and the duration timer is
    /// armed (replacing, never stacking, any prior timer).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Validation`] for a non-positive duration.
    pub async fn start_meeting(
        &self,
        duration_secs: i64,
        trigger: MeetingTrigger,
    ) -> Result<bool, GameError> {
        if duration_secs <= 0 {
            return Err(GameError::Validation(
                "meeting duration must be positive".to_string(),
            ));
        }
        let started = self
            .store()
            .activate_meeting(self.now(), duration_secs, trigger)
            .await?;
        if !started {
            tracing::info!(?trigger, "meeting already active; start ignored");
            return Ok(false);
        }
        let kill_logs = self
            .store()
            .all_bodies()
            .await?
            .into_iter()
            .map(|b| KillLog {
                victim_name: b.victim_name,
                killer_name: b.killer_name,
                death_time: b.death_time,
            })
            .collect();
        self.broadcaster().broadcast(&ServerEvent::MeetingStarted {
            duration: duration_secs,
            trigger,
            kill_logs,
        });
        self.arm_meeting_timer(duration_secs);
        tracing::info!(?trigger, duration_secs, "meeting started");
        Ok(true)
    }

    #[allow(clippy::cast_sign_loss)]
    fn arm_meeting_timer(&self, duration_secs: i64) {
        let Some(session) = self.weak.upgrade() else {
            return;
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(duration_secs.max(0) as u64)).await;
            // Drop our own handle without aborting; an abort here would
            // cancel the resolution we are about to run.
            session
                .meeting_timer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Err(err) = session.resolve_meeting().await {
                tracing::error!(%err, "timed meeting resolution failed");
            }
        });
        let previous = self
            .meeting_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// End the active meeting now. Cancels the pending duration timer
    /// before resolving, so resolution runs exactly once. Returns `None`
    /// when no meeting was active.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn end_meeting(&self) -> Result<Option<MeetingOutcome>, GameError> {
        let pending = self
            .meeting_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = pending {
            timer.abort();
        }
        self.resolve_meeting().await
    }

    /// The shared resolution routine: tally votes, execute the leader
    /// (random among ties), clear all votes, evaluate the win condition,
    /// and broadcast `meetingEnded`. The conditional deactivate at the top
    /// makes this idempotent under timer/manual interleaving.
    pub(crate) async fn resolve_meeting(&self) -> Result<Option<MeetingOutcome>, GameError> {
        if !self.store().deactivate_meeting().await? {
            return Ok(None);
        }
        let counts = self.store().vote_counts().await?;
        let executed = match counts.iter().map(|c| c.count).max() {
            None => None,
            Some(max_count) => {
                let candidates: Vec<_> =
                    counts.iter().filter(|c| c.count == max_count).collect();
                // Ties execute one leader uniformly at random. "No
                // execution on tie" is a possible rule variant; the random
                // pick is the deliberate choice here.
                let chosen = if candidates.len() == 1 {
                    candidates[0]
                } else {
                    candidates[self.pick(candidates.len())]
                };
                match self.store().player_by_id(chosen.player_id).await? {
                    None => None,
                    Some(player) => {
                        // A leader killed mid-meeting is already dead and
                        // is not reported as executed.
                        if self.store().mark_dead(&player.device_id).await? {
                            // Death by the crowd: no killer on the Body.
                            if let Err(err) = self.store().insert_body(&player, None).await {
                                tracing::error!(%err, "body record failed after execution");
                            }
                            tracing::info!(name = %player.name, votes = max_count, "player executed");
                            Some(ExecutedPlayer {
                                name: player.name,
                                device_id: player.device_id,
                            })
                        } else {
                            tracing::info!(name = %player.name, "vote leader already dead; no execution");
                            None
                        }
                    }
                }
            }
        };
        self.store().clear_votes().await?;
        let game_ended = match self.evaluate_progress().await? {
            WinState::Ended(outcome) => Some(outcome),
            WinState::Ongoing(_) => None,
        };
        self.broadcaster().broadcast(&ServerEvent::MeetingEnded {
            executed: executed.clone(),
            game_ended: game_ended.clone(),
        });
        tracing::info!(executed = executed.is_some(), ended = game_ended.is_some(), "meeting resolved");
        Ok(Some(MeetingOutcome {
            executed,
            game_ended,
        }))
    }

    /// Current meeting state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn meeting_status(&self) -> Result<MeetingState, GameError> {
        self.store().meeting_state().await
    }

    /// Record a vote and broadcast the updated tally to everyone.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for unknown players and
    /// [`GameError::Conflict`] for a repeat vote for the same target.
    pub async fn cast_vote(
        &self,
        device_id: &str,
        target_device_id: &str,
    ) -> Result<VoteAction, GameError> {
        let voter = self.store().require_player(device_id).await?;
        let target = self.store().require_player(target_device_id).await?;
        let action = self.store().upsert_vote(voter.id, target.id).await?;
        let counts = self.store().vote_counts().await?;
        self.broadcaster()
            .broadcast(&ServerEvent::VoteUpdate { counts });
        tracing::info!(device_id, target = target_device_id, ?action, "vote recorded");
        Ok(action)
    }

    /// File a report. Appends to the report log, opens a report meeting
    /// (a no-op if one is already running), and notifies all connected
    /// clients. Returns the report id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown reporter or named
    /// player.
    pub async fn submit_report(
        &self,
        device_id: &str,
        reported_device_id: Option<&str>,
    ) -> Result<i64, GameError> {
        let reporter = self.store().require_player(device_id).await?;
        let reported_id = match reported_device_id {
            Some(device) => Some(self.store().require_player(device).await?.id),
            None => None,
        };
        let report_id = self.store().insert_report(reporter.id, reported_id).await?;
        self.start_meeting(self.config().report_meeting_secs, MeetingTrigger::Report)
            .await?;
        self.broadcaster()
            .broadcast(&ServerEvent::ReportNotification {
                message: "a report was filed; meeting starting".to_string(),
            });
        tracing::info!(device_id, report_id, "report submitted");
        Ok(report_id)
    }
}
