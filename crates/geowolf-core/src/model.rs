//! Domain entities.
//!
//! These mirror the persisted rows; wire DTOs serialize them camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Position;

/// Hidden role of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Completes tasks; wins via task completion.
    Villager,
    /// Can kill villagers; wins by reducing villagers to parity.
    Saboteur,
}

impl Role {
    /// Database text representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Villager => "villager",
            Self::Saboteur => "saboteur",
        }
    }

    /// Parse the database text representation; unknown text reads as
    /// villager rather than failing the row.
    #[must_use]
    pub fn from_str_soft(raw: &str) -> Self {
        match raw {
            "saboteur" => Self::Saboteur,
            _ => Self::Villager,
        }
    }
}

/// A registered player. Never hard-deleted during a game; death is the
/// `alive` flag going false.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub device_id: String,
    pub name: String,
    pub position: Position,
    pub role: Role,
    pub alive: bool,
    pub color: String,
    /// Compass heading in `[0, 360)` degrees.
    pub facing_angle: f64,
}

/// An immutable catalog entry loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: i64,
    pub name: String,
    pub place: String,
    pub position: Position,
}

/// A mission instantiated for one player, with a deadline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub player_id: i64,
    pub mission_id: i64,
    pub position: Position,
    pub done: bool,
    pub content: String,
    pub place: String,
    pub deadline: DateTime<Utc>,
}

/// A chat message with its sender resolved. The recipient set is computed
/// at send time and frozen; it is not part of this view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub position: Position,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated vote count for one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount {
    pub player_id: i64,
    pub name: String,
    pub count: i64,
}

/// Whether (and for whom) a voter has a live vote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_device_id: Option<String>,
}

/// Outcome of a vote upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    /// First vote by this voter.
    Created,
    /// Existing vote rewritten to a different target.
    Updated,
}

/// An append-only report record. Naming a player is optional metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub reporter_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Persisted record of a death; immutable once created. Exactly one exists
/// per alive→dead transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub id: i64,
    pub victim_id: i64,
    pub victim_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer_name: Option<String>,
    pub death_position: Position,
    pub death_time: DateTime<Utc>,
}

/// What opened a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingTrigger {
    Report,
    Manual,
    Auto,
    Startup,
}

impl MeetingTrigger {
    /// Database text representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Manual => "manual",
            Self::Auto => "auto",
            Self::Startup => "startup",
        }
    }

    /// Parse the database text representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "report" => Some(Self::Report),
            "manual" => Some(Self::Manual),
            "auto" => Some(Self::Auto),
            "startup" => Some(Self::Startup),
            _ => None,
        }
    }
}

/// The singleton meeting record. Only one meeting may be active
/// process-wide at any time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingState {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    pub duration_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<MeetingTrigger>,
}

/// Task counts used by win evaluation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub villager_tasks: i64,
    pub completed_villager_tasks: i64,
}
