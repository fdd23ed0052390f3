//! Background scheduling: the delayed startup meeting, the recurring
//! automatic meeting, and the expired-task sweeper.
//!
//! Each loop holds only a [`Weak`] reference to the session and exits when
//! the session is dropped, so the scheduler never keeps a torn-down game
//! alive.

use std::sync::{Arc, Weak};

use geowolf_core::model::MeetingTrigger;

use crate::session::GameSession;

/// Spawns and owns the session's periodic work.
pub struct GameClock {
    session: Weak<GameSession>,
}

impl GameClock {
    #[must_use]
    pub fn new(session: &Arc<GameSession>) -> Self {
        Self {
            session: Arc::downgrade(session),
        }
    }

    /// Spawn all background loops. Tasks are detached; they stop on their
    /// own once the session is gone.
    pub fn spawn(self) {
        tokio::spawn(startup_meeting(self.session.clone()));
        tokio::spawn(auto_meetings(self.session.clone()));
        tokio::spawn(task_sweeper(self.session));
    }
}

/// One-shot: shortly after boot, open a meeting so players who joined
/// during the lobby phase synchronize. Skipped when too few players are
/// alive.
async fn startup_meeting(session: Weak<GameSession>) {
    let delay = match session.upgrade() {
        Some(session) => session.config().startup_meeting_delay,
        None => return,
    };
    tokio::time::sleep(delay).await;
    let Some(session) = session.upgrade() else {
        return;
    };
    match alive_count(&session).await {
        Ok(alive) if alive >= session.config().min_alive_for_meeting => {
            let duration = session.config().auto_meeting_secs;
            if let Err(err) = session.start_meeting(duration, MeetingTrigger::Startup).await {
                tracing::error!(%err, "startup meeting failed");
            }
        }
        Ok(alive) => {
            tracing::info!(alive, "skipping startup meeting, not enough players");
        }
        Err(err) => tracing::error!(%err, "startup meeting roster check failed"),
    }
}

/// Recurring: open an automatic meeting on a fixed interval, skipping
/// ticks where a meeting is already running or too few players are alive.
async fn auto_meetings(session: Weak<GameSession>) {
    let interval = match session.upgrade() {
        Some(session) => session.config().auto_meeting_interval,
        None => return,
    };
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; consume it so the first
    // automatic meeting lands a full interval after boot.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            return;
        };
        if let Err(err) = auto_meeting_tick(&session).await {
            tracing::error!(%err, "automatic meeting tick failed");
        }
    }
}

async fn auto_meeting_tick(session: &Arc<GameSession>) -> Result<(), geowolf_core::error::GameError> {
    if session.meeting_status().await?.active {
        return Ok(());
    }
    if alive_count(session).await? < session.config().min_alive_for_meeting {
        return Ok(());
    }
    session
        .start_meeting(session.config().auto_meeting_secs, MeetingTrigger::Auto)
        .await?;
    Ok(())
}

/// Recurring: replace overdue tasks.
async fn task_sweeper(session: Weak<GameSession>) {
    let interval = match session.upgrade() {
        Some(session) => session.config().task_sweep_interval,
        None => return,
    };
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            return;
        };
        match session.expire_due_tasks().await {
            Ok(0) => {}
            Ok(expired) => tracing::info!(expired, "replaced expired tasks"),
            Err(err) => tracing::error!(%err, "task sweep failed"),
        }
    }
}

async fn alive_count(session: &Arc<GameSession>) -> Result<usize, geowolf_core::error::GameError> {
    let players = session.store().all_players().await?;
    Ok(players.iter().filter(|p| p.alive).count())
}
