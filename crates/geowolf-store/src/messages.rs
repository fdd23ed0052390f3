//! Message persistence.
//!
//! The recipient set is computed at send time and frozen; later player
//! movement never changes who received a message.

use geowolf_core::error::GameError;
use geowolf_core::geo::Position;
use geowolf_core::model::Message;

use crate::rows::MessageRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Persist a message stamped with the sender's position at send time.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn insert_message(
        &self,
        sender_id: i64,
        content: &str,
        position: Position,
    ) -> Result<i64, GameError> {
        let result = sqlx::query("INSERT INTO messages (sender_id, content, position) VALUES (?, ?, ?)")
            .bind(sender_id)
            .bind(content)
            .bind(position.to_json())
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(result.last_insert_rowid())
    }

    /// Freeze the recipient set of a message.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn add_recipients(
        &self,
        message_id: i64,
        recipient_ids: &[i64],
    ) -> Result<(), GameError> {
        for recipient_id in recipient_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO message_recipients (message_id, recipient_id) VALUES (?, ?)",
            )
            .bind(message_id)
            .bind(recipient_id)
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        }
        Ok(())
    }

    /// The frozen recipient set of a message.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn message_recipients(&self, message_id: i64) -> Result<Vec<i64>, GameError> {
        sqlx::query_scalar("SELECT recipient_id FROM message_recipients WHERE message_id = ?")
            .bind(message_id)
            .fetch_all(self.pool())
            .await
            .map_err(GameError::storage)
    }

    /// Messages a player received, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn messages_for_player(&self, player_id: i64) -> Result<Vec<Message>, GameError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT m.id, m.sender_id, p.name AS sender_name, m.content, m.position, m.timestamp
             FROM messages m
             JOIN message_recipients mr ON m.id = mr.message_id
             JOIN players p ON m.sender_id = p.id
             WHERE mr.recipient_id = ?
             ORDER BY m.timestamp DESC, m.id DESC",
        )
        .bind(player_id)
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
