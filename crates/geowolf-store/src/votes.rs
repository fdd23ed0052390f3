//! Vote persistence. At most one live vote per voter.

use geowolf_core::error::GameError;
use geowolf_core::model::{VoteAction, VoteCount, VoteStatus};

use crate::rows::VoteCountRow;
use crate::store::SessionStore;

impl SessionStore {
    /// Record a vote. A first vote inserts; a vote for a different target
    /// rewrites the existing row; a repeat vote for the same target is a
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Conflict`] on a duplicate vote for the same
    /// target.
    pub async fn upsert_vote(&self, voter_id: i64, target_id: i64) -> Result<VoteAction, GameError> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT target_id FROM votes WHERE voter_id = ?")
                .bind(voter_id)
                .fetch_optional(self.pool())
                .await
                .map_err(GameError::storage)?;
        match existing {
            Some(current) if current == target_id => Err(GameError::Conflict(
                "already voted for this player".to_string(),
            )),
            Some(_) => {
                sqlx::query(
                    "UPDATE votes SET target_id = ?, timestamp = datetime('now') WHERE voter_id = ?",
                )
                .bind(target_id)
                .bind(voter_id)
                .execute(self.pool())
                .await
                .map_err(GameError::storage)?;
                Ok(VoteAction::Updated)
            }
            None => {
                sqlx::query("INSERT INTO votes (voter_id, target_id) VALUES (?, ?)")
                    .bind(voter_id)
                    .bind(target_id)
                    .execute(self.pool())
                    .await
                    .map_err(GameError::storage)?;
                Ok(VoteAction::Created)
            }
        }
    }

    /// Current tally, grouped by target, highest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn vote_counts(&self) -> Result<Vec<VoteCount>, GameError> {
        let rows = sqlx::query_as::<_, VoteCountRow>(
            "SELECT p.id AS player_id, p.name, COUNT(v.id) AS count
             FROM votes v
             JOIN players p ON p.id = v.target_id
             GROUP BY v.target_id
             ORDER BY count DESC, p.id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(rows.into_iter().map(VoteCount::from).collect())
    }

    /// Whether a voter has a live vote, and for whom.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn vote_status(&self, voter_id: i64) -> Result<VoteStatus, GameError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT p.name, p.device_id
             FROM votes v JOIN players p ON v.target_id = p.id
             WHERE v.voter_id = ?",
        )
        .bind(voter_id)
        .fetch_optional(self.pool())
        .await
        .map_err(GameError::storage)?;
        Ok(match row {
            Some((target_name, target_device_id)) => VoteStatus {
                has_voted: true,
                target_name: Some(target_name),
                target_device_id: Some(target_device_id),
            },
            None => VoteStatus {
                has_voted: false,
                target_name: None,
                target_device_id: None,
            },
        })
    }

    /// Remove every live vote. Runs as part of meeting resolution.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn clear_votes(&self) -> Result<(), GameError> {
        sqlx::query("DELETE FROM votes")
            .execute(self.pool())
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }
}
