//! Row structs and their conversions into domain entities.
//!
//! Position blobs are parsed fail-soft: they are written by a less-trusted
//! code path than the read, so a corrupt blob falls back to the default
//! coordinate instead of failing the row.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use geowolf_core::geo::Position;
use geowolf_core::model::{
    Body, MeetingState, MeetingTrigger, Message, Player, Report, Role, Task, VoteCount,
};

#[derive(Debug, FromRow)]
pub(crate) struct PlayerRow {
    pub id: i64,
    pub device_id: String,
    pub name: String,
    pub position: String,
    pub role: String,
    pub alive: bool,
    pub color: String,
    pub angle: f64,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: row.id,
            device_id: row.device_id,
            name: row.name,
            position: Position::from_json(&row.position),
            role: Role::from_str_soft(&row.role),
            alive: row.alive,
            color: row.color,
            facing_angle: row.angle,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TaskRow {
    pub id: i64,
    pub player_id: i64,
    pub mission_id: i64,
    pub position: String,
    pub done: bool,
    pub content: String,
    pub place: String,
    pub deadline: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            player_id: row.player_id,
            mission_id: row.mission_id,
            position: Position::from_json(&row.position),
            done: row.done,
            content: row.content,
            place: row.place,
            deadline: row.deadline,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub position: String,
    pub timestamp: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            content: row.content,
            position: Position::from_json(&row.position),
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VoteCountRow {
    pub player_id: i64,
    pub name: String,
    pub count: i64,
}

impl From<VoteCountRow> for VoteCount {
    fn from(row: VoteCountRow) -> Self {
        Self {
            player_id: row.player_id,
            name: row.name,
            count: row.count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ReportRow {
    pub id: i64,
    pub reporter_name: String,
    pub reported_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            reporter_name: row.reporter_name,
            reported_name: row.reported_name,
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BodyRow {
    pub id: i64,
    pub victim_id: i64,
    pub victim_name: String,
    pub killer_id: Option<i64>,
    pub killer_name: Option<String>,
    pub death_position: String,
    pub death_time: DateTime<Utc>,
}

impl From<BodyRow> for Body {
    fn from(row: BodyRow) -> Self {
        Self {
            id: row.id,
            victim_id: row.victim_id,
            victim_name: row.victim_name,
            killer_id: row.killer_id,
            killer_name: row.killer_name,
            death_position: Position::from_json(&row.death_position),
            death_time: row.death_time,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MeetingRow {
    pub active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_secs: i64,
    pub trigger_kind: Option<String>,
}

impl From<MeetingRow> for MeetingState {
    fn from(row: MeetingRow) -> Self {
        Self {
            active: row.active,
            start_time: row.start_time,
            duration_secs: row.duration_secs,
            trigger: row.trigger_kind.as_deref().and_then(MeetingTrigger::parse),
        }
    }
}
