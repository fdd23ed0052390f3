//! Realtime fan-out.
//!
//! The broadcaster maps device identity to the live connection's event
//! sender. A connection that has not completed the init handshake is not
//! registered and belongs to no recipient set. Reconnection supersedes the
//! prior socket silently; connection ids are compared on removal so a stale
//! socket's cleanup cannot evict its successor.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use geowolf_core::model::{MeetingTrigger, VoteAction, VoteCount};

use crate::meeting::{ExecutedPlayer, KillLog};
use crate::win::GameOutcome;

/// A typed event pushed to clients over the realtime channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A chat message, delivered to its frozen recipient set.
    #[serde(rename = "chat", rename_all = "camelCase")]
    Chat {
        id: i64,
        sender_id: i64,
        sender_name: String,
        content: String,
        timestamp: DateTime<Utc>,
        is_meeting_chat: bool,
    },

    /// A meeting opened; sent to all connected clients.
    #[serde(rename = "meetingStarted", rename_all = "camelCase")]
    MeetingStarted {
        /// Duration in seconds.
        duration: i64,
        trigger: MeetingTrigger,
        kill_logs: Vec<KillLog>,
    },

    /// A meeting resolved; sent to all connected clients.
    #[serde(rename = "meetingEnded", rename_all = "camelCase")]
    MeetingEnded {
        #[serde(skip_serializing_if = "Option::is_none")]
        executed: Option<ExecutedPlayer>,
        #[serde(skip_serializing_if = "Option::is_none")]
        game_ended: Option<GameOutcome>,
    },

    /// A report was filed; sent to all connected clients.
    #[serde(rename = "reportNotification")]
    ReportNotification { message: String },

    /// Chat rejected; sent to the sender only.
    #[serde(rename = "chat_error")]
    ChatError { error: String, message: String },

    /// Tally update after any vote; sent to all connected clients.
    #[serde(rename = "vote_update")]
    VoteUpdate { counts: Vec<VoteCount> },

    /// Vote accepted; sent to the voter only.
    #[serde(rename = "vote_success")]
    VoteSuccess { action: VoteAction, message: String },

    /// Vote rejected; sent to the voter only.
    #[serde(rename = "vote_error")]
    VoteError { error: String, message: String },

    /// Report accepted; sent to the reporter only.
    #[serde(rename = "report_success")]
    ReportSuccess { message: String },

    /// Report rejected; sent to the reporter only.
    #[serde(rename = "report_error")]
    ReportError { message: String },

    /// Sent to the victim only. Other clients learn of deaths from the
    /// kill logs at the next meeting start.
    #[serde(rename = "killed")]
    Killed { message: String },

    /// Sent to the killer only.
    #[serde(rename = "kill_success")]
    KillSuccess { message: String },

    /// Sent to the would-be killer only.
    #[serde(rename = "kill_error")]
    KillError { error: String, message: String },
}

#[derive(Debug, Clone)]
struct Connection {
    id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

/// Device → live connection registry.
#[derive(Debug, Default)]
pub struct Broadcaster {
    conns: RwLock<HashMap<String, Connection>>,
}

impl Broadcaster {
    /// Register a connection for a device, superseding any prior one.
    /// Returns the connection id the caller must present to unregister.
    pub fn register(&self, device_id: &str, tx: mpsc::UnboundedSender<ServerEvent>) -> Uuid {
        let id = Uuid::new_v4();
        self.conns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device_id.to_string(), Connection { id, tx });
        id
    }

    /// Remove a device mapping, but only if it still belongs to the given
    /// connection. A superseded socket's teardown must not drop its
    /// replacement.
    pub fn unregister(&self, device_id: &str, conn_id: Uuid) {
        let mut conns = self.conns.write().unwrap_or_else(PoisonError::into_inner);
        if conns.get(device_id).is_some_and(|c| c.id == conn_id) {
            conns.remove(device_id);
        }
    }

    /// Whether a device currently has a live connection.
    #[must_use]
    pub fn is_connected(&self, device_id: &str) -> bool {
        self.conns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(device_id)
    }

    /// Number of live connections.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.conns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Push an event to one device, if connected. Send failures mean the
    /// socket task already exited; cleanup happens on unregister.
    pub fn send_to(&self, device_id: &str, event: &ServerEvent) {
        let conns = self.conns.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = conns.get(device_id) {
            let _ = conn.tx.send(event.clone());
        }
    }

    /// Push an event to each listed device that is connected.
    pub fn send_to_many<'a>(
        &self,
        device_ids: impl IntoIterator<Item = &'a str>,
        event: &ServerEvent,
    ) {
        let conns = self.conns.read().unwrap_or_else(PoisonError::into_inner);
        for device_id in device_ids {
            if let Some(conn) = conns.get(device_id) {
                let _ = conn.tx.send(event.clone());
            }
        }
    }

    /// Push an event to every connected client.
    pub fn broadcast(&self, event: &ServerEvent) {
        let conns = self.conns.read().unwrap_or_else(PoisonError::into_inner);
        for conn in conns.values() {
            let _ = conn.tx.send(event.clone());
        }
    }
}
