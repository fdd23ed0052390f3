//! WebSocket endpoint: the realtime channel.
//!
//! A connection is anonymous until the client sends the init handshake
//! `{"type":"init","deviceId":...}`; only then is it registered with the
//! broadcaster and eligible to receive events. Client commands (`chat`,
//! `vote`, `report`, `kill`) map to session operations; rejections go back
//! to this connection only as typed `*_error` events. Liveness is probed
//! with periodic pings; a connection that misses a probe window is dropped.

use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::any};
use futures_util::sink::SinkExt;
use futures_util::stream::{SplitSink, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use geowolf_game::GameSession;
use geowolf_game::broadcast::ServerEvent;

use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Messages a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
enum ClientMessage {
    Init {
        device_id: String,
    },
    Chat {
        content: String,
        radius: Option<f64>,
    },
    Vote {
        target_device_id: String,
    },
    Report {
        reported_device_id: Option<String>,
    },
    Kill {
        target_device_id: String,
    },
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Handshake: the first parseable message must be init with a
    // registered device; anything else closes the connection.
    let device_id = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str(&text) {
                Ok(ClientMessage::Init { device_id }) => break device_id,
                Ok(_) => {
                    debug!("command before init; closing socket");
                    return;
                }
                Err(err) => {
                    debug!(%err, "unparseable handshake; closing socket");
                    return;
                }
            },
            Some(Ok(Message::Ping(payload))) => {
                if socket.send(Message::Pong(payload)).await.is_err() {
                    return;
                }
            }
            Some(Ok(_)) => {}
            Some(Err(_)) | None => return,
        }
    };

    match state.session.store().device_registered(&device_id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(device_id, "init for unregistered device; closing socket");
            return;
        }
        Err(err) => {
            warn!(device_id, %err, "registration check failed; closing socket");
            return;
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn_id = state.session.broadcaster().register(&device_id, tx);
    info!(device_id, %conn_id, "websocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await;
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    dispatch(&state.session, &device_id, &text).await;
                }
                Some(Ok(Message::Pong(_))) => awaiting_pong = false,
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(device_id, %err, "websocket read error");
                    break;
                }
            },
            event = rx.recv() => match event {
                Some(event) => {
                    if forward(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                // Broadcaster side dropped the channel: superseded by a
                // newer connection for this device.
                None => break,
            },
            _ = ping.tick() => {
                if awaiting_pong {
                    info!(device_id, "missed ping window; dropping connection");
                    break;
                }
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }
        }
    }

    state.session.broadcaster().unregister(&device_id, conn_id);
    info!(device_id, %conn_id, "websocket disconnected");
}

async fn forward(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(err) => {
            warn!(%err, "event serialization failed");
            Ok(())
        }
    }
}

/// Route one client command to the session. Rejections become `*_error`
/// events sent back to this device only.
async fn dispatch(session: &GameSession, device_id: &str, raw: &str) {
    let message: ClientMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(err) => {
            debug!(device_id, %err, "unparseable client message");
            return;
        }
    };
    match message {
        ClientMessage::Init { .. } => {
            debug!(device_id, "duplicate init ignored");
        }
        ClientMessage::Chat { content, radius } => {
            // Delivery to recipients happens inside the chat path.
            if let Err(err) = session.send_chat(device_id, &content, radius).await {
                session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::ChatError {
                        error: err.code().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        }
        ClientMessage::Vote { target_device_id } => {
            match session.cast_vote(device_id, &target_device_id).await {
                Ok(action) => session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::VoteSuccess {
                        action,
                        message: "vote recorded".to_string(),
                    },
                ),
                Err(err) => session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::VoteError {
                        error: err.code().to_string(),
                        message: err.to_string(),
                    },
                ),
            }
        }
        ClientMessage::Report { reported_device_id } => {
            match session
                .submit_report(device_id, reported_device_id.as_deref())
                .await
            {
                Ok(_) => session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::ReportSuccess {
                        message: "report filed".to_string(),
                    },
                ),
                Err(err) => session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::ReportError {
                        message: err.to_string(),
                    },
                ),
            }
        }
        ClientMessage::Kill { target_device_id } => {
            // Success notifications go out inside the kill path itself.
            if let Err(err) = session.attempt_kill(device_id, &target_device_id).await {
                session.broadcaster().send_to(
                    device_id,
                    &ServerEvent::KillError {
                        error: err.code().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        }
    }
}

/// Returns the websocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", any(ws_handler))
}
