//! Win-condition evaluation.

use serde::Serialize;

use geowolf_core::error::GameError;
use geowolf_core::model::{Player, Role, TaskStats};

use crate::session::GameSession;

/// Which faction won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Villagers,
    Saboteurs,
}

/// A finished game: the winning faction and a human-readable reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub winner: Winner,
    pub reason: String,
}

/// Progress counters for a game still in play.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub completed_tasks: i64,
    pub required_tasks: i64,
    pub tasks_remaining: i64,
    pub alive_villagers: usize,
    pub alive_saboteurs: usize,
}

/// Result of a win check.
#[derive(Debug, Clone)]
pub enum WinState {
    Ended(GameOutcome),
    Ongoing(ProgressSnapshot),
}

// Wire shape: `{"gameEnded":true,"winner":…,"reason":…}` for a finished
// game, `{"gameEnded":false,"progress":{…}}` otherwise.
impl Serialize for WinState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        match self {
            WinState::Ended(outcome) => {
                let mut state = serializer.serialize_struct("WinState", 3)?;
                state.serialize_field("gameEnded", &true)?;
                state.serialize_field("winner", &outcome.winner)?;
                state.serialize_field("reason", &outcome.reason)?;
                state.end()
            }
            WinState::Ongoing(snapshot) => {
                let mut state = serializer.serialize_struct("WinState", 2)?;
                state.serialize_field("gameEnded", &false)?;
                state.serialize_field("progress", snapshot)?;
                state.end()
            }
        }
    }
}

/// Evaluate the win condition over the current roster and task counters.
///
/// Saboteur parity is checked first: when living saboteurs equal or
/// outnumber living villagers (and at least one saboteur lives), the
/// saboteurs win regardless of task progress. Otherwise villagers win once
/// completed villager tasks reach three quarters of all villager tasks,
/// rounded up. An empty roster or a game with no villager tasks yet is
/// always ongoing.
#[must_use]
pub fn evaluate(players: &[Player], stats: &TaskStats) -> WinState {
    let alive_villagers = players
        .iter()
        .filter(|p| p.alive && p.role == Role::Villager)
        .count();
    let alive_saboteurs = players
        .iter()
        .filter(|p| p.alive && p.role == Role::Saboteur)
        .count();

    // Three quarters rounded up; task counts are never negative.
    let required = (3 * stats.villager_tasks + 3) / 4;

    if !players.is_empty() && alive_saboteurs > 0 && alive_saboteurs >= alive_villagers {
        return WinState::Ended(GameOutcome {
            winner: Winner::Saboteurs,
            reason: "saboteurs match or outnumber the living villagers".to_string(),
        });
    }
    if required > 0 && stats.completed_villager_tasks >= required {
        return WinState::Ended(GameOutcome {
            winner: Winner::Villagers,
            reason: "villagers completed enough tasks".to_string(),
        });
    }
    WinState::Ongoing(ProgressSnapshot {
        completed_tasks: stats.completed_villager_tasks,
        required_tasks: required,
        tasks_remaining: (required - stats.completed_villager_tasks).max(0),
        alive_villagers,
        alive_saboteurs,
    })
}

impl GameSession {
    /// Run the win check against live store state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn evaluate_progress(&self) -> Result<WinState, GameError> {
        let players = self.store().all_players().await?;
        let stats = self.store().task_stats().await?;
        Ok(evaluate(&players, &stats))
    }
}
