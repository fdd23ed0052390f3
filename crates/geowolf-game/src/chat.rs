//! Proximity-gated messaging.

use geowolf_core::error::GameError;
use geowolf_core::geo::ProximityIndex;
use geowolf_core::model::Message;

use crate::broadcast::ServerEvent;
use crate::session::GameSession;

impl GameSession {
    /// Send a chat message. The recipient set is computed from player
    /// positions at send time and frozen; during an active meeting the
    /// radius is unbounded so chat reaches every player. Returns the
    /// message id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Validation`] for empty content and
    /// [`GameError::NotFound`] for an unknown sender.
    pub async fn send_chat(
        &self,
        device_id: &str,
        content: &str,
        radius_m: Option<f64>,
    ) -> Result<i64, GameError> {
        if content.trim().is_empty() {
            return Err(GameError::Validation("message content is required".to_string()));
        }
        let sender = self.store().require_player(device_id).await?;
        let meeting_active = self.store().meeting_state().await?.active;
        let effective_radius = if meeting_active {
            None
        } else {
            Some(radius_m.unwrap_or(self.config().chat_radius_m))
        };

        let players = self.store().all_players().await?;
        let index = ProximityIndex::new(players.iter().map(|p| (p.id, p.position)).collect());
        let recipient_ids = index.nearby(sender.position, effective_radius);

        let message_id = self
            .store()
            .insert_message(sender.id, content, sender.position)
            .await?;
        let frozen: Vec<i64> = recipient_ids.iter().copied().collect();
        self.store().add_recipients(message_id, &frozen).await?;

        let event = ServerEvent::Chat {
            id: message_id,
            sender_id: sender.id,
            sender_name: sender.name.clone(),
            content: content.to_string(),
            timestamp: self.now(),
            is_meeting_chat: meeting_active,
        };
        let recipient_devices = players
            .iter()
            .filter(|p| recipient_ids.contains(&p.id))
            .map(|p| p.device_id.as_str());
        self.broadcaster().send_to_many(recipient_devices, &event);

        tracing::info!(
            device_id,
            message_id,
            recipients = frozen.len(),
            meeting_active,
            "chat delivered"
        );
        Ok(message_id)
    }

    /// Messages a player has received, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device.
    pub async fn messages_for(&self, device_id: &str) -> Result<Vec<Message>, GameError> {
        let player = self.store().require_player(device_id).await?;
        self.store().messages_for_player(player.id).await
    }
}
