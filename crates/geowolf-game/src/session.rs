//! The `GameSession` context object.
//!
//! Owns every piece of per-process game state — store handle, broadcaster,
//! mission catalog, RNG, clock, meeting timer — and is injected into HTTP
//! and socket handlers. Constructing two sessions yields two fully
//! independent games.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use geowolf_core::clock::Clock;
use geowolf_core::error::GameError;
use geowolf_core::geo::{Position, ProximityIndex};
use geowolf_core::model::{Mission, Player, Role};
use geowolf_core::rng::GameRng;
use geowolf_store::SessionStore;

use crate::broadcast::{Broadcaster, ServerEvent};
use crate::config::GameConfig;
use crate::tasks::AssignReason;

/// Authoritative state machine for one running game.
pub struct GameSession {
    store: SessionStore,
    broadcaster: Broadcaster,
    catalog: Vec<Mission>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn GameRng>>,
    config: GameConfig,
    pub(crate) meeting_timer: Mutex<Option<JoinHandle<()>>>,
    pub(crate) weak: Weak<GameSession>,
}

impl GameSession {
    /// Build a session. The weak self-reference lets the meeting timer
    /// re-enter the session without keeping it alive on its own.
    #[must_use]
    pub fn new(
        store: SessionStore,
        catalog: Vec<Mission>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn GameRng>,
        config: GameConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            store,
            broadcaster: Broadcaster::default(),
            catalog,
            clock,
            rng: Mutex::new(rng),
            config,
            meeting_timer: Mutex::new(None),
            weak: weak.clone(),
        })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The realtime broadcaster.
    #[must_use]
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// The immutable mission catalog.
    #[must_use]
    pub fn catalog(&self) -> &[Mission] {
        &self.catalog
    }

    /// Session parameters.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Uniform random index in `0..len`.
    pub(crate) fn pick(&self, len: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pick(len)
    }

    /// Register a player, assigning a fresh task batch on first creation.
    /// Re-registering a known device returns the existing id without new
    /// tasks. Returns `(player_id, task_ids)`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Validation`] for empty fields.
    pub async fn register_player(
        &self,
        device_id: &str,
        name: &str,
        color: &str,
    ) -> Result<(i64, Vec<i64>), GameError> {
        if device_id.trim().is_empty() || name.trim().is_empty() || color.trim().is_empty() {
            return Err(GameError::Validation(
                "deviceId, name, and color are required".to_string(),
            ));
        }
        let (player_id, created) = self.store.create_player(device_id, name, color).await?;
        if !created {
            tracing::info!(device_id, player_id, "device already registered");
            return Ok((player_id, Vec::new()));
        }
        tracing::info!(device_id, player_id, name, "player registered");
        let task_ids = match self.assign_tasks(device_id, AssignReason::Normal).await {
            Ok(ids) => ids,
            // Registration succeeds even when the catalog is exhausted.
            Err(GameError::Validation(reason)) => {
                tracing::warn!(device_id, %reason, "no tasks assigned at registration");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        Ok((player_id, task_ids))
    }

    /// The full roster. Lazily promotes one random player to saboteur when
    /// a non-empty roster has none.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn roster(&self) -> Result<Vec<Player>, GameError> {
        self.ensure_saboteur().await?;
        self.store.all_players().await
    }

    /// Promote one player to saboteur if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn ensure_saboteur(&self) -> Result<(), GameError> {
        let players = self.store.all_players().await?;
        if players.is_empty() || players.iter().any(|p| p.role == Role::Saboteur) {
            return Ok(());
        }
        let chosen = &players[self.pick(players.len())];
        self.store
            .set_role(&chosen.device_id, Role::Saboteur)
            .await?;
        tracing::info!(device_id = %chosen.device_id, name = %chosen.name, "saboteur assigned");
        Ok(())
    }

    /// Look up one player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device.
    pub async fn player(&self, device_id: &str) -> Result<Player, GameError> {
        self.store.require_player(device_id).await
    }

    /// Update a player's position.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device.
    pub async fn update_position(
        &self,
        device_id: &str,
        position: Position,
    ) -> Result<(), GameError> {
        if self.store.update_position(device_id, position).await? {
            Ok(())
        } else {
            Err(GameError::NotFound(format!("player {device_id}")))
        }
    }

    /// Update a player's compass heading.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Validation`] for an out-of-range angle and
    /// [`GameError::NotFound`] for an unknown device.
    pub async fn update_angle(&self, device_id: &str, angle: f64) -> Result<(), GameError> {
        if self.store.update_angle(device_id, angle).await? {
            Ok(())
        } else {
            Err(GameError::NotFound(format!("player {device_id}")))
        }
    }

    /// Set a player's alive flag. Flipping a living player to dead is the
    /// generic death path: one Body with no killer, and a `killed` event to
    /// the victim's connection only. Setting an already-dead player dead
    /// again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] for an unknown device.
    pub async fn set_alive(&self, device_id: &str, alive: bool) -> Result<(), GameError> {
        if alive {
            if self.store.revive(device_id).await? {
                return Ok(());
            }
            return Err(GameError::NotFound(format!("player {device_id}")));
        }
        let victim = self.store.require_player(device_id).await?;
        if self.store.mark_dead(device_id).await? {
            // Best effort: a failed Body write never rolls back the death.
            if let Err(err) = self.store.insert_body(&victim, None).await {
                tracing::error!(device_id, %err, "body record failed after death");
            }
            self.broadcaster.send_to(
                device_id,
                &ServerEvent::Killed {
                    message: "you died".to_string(),
                },
            );
            tracing::info!(device_id, name = %victim.name, "player died");
        }
        Ok(())
    }

    /// Players within `radius_m` meters of a point.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] on persistence failure.
    pub async fn nearby_players(
        &self,
        origin: Position,
        radius_m: Option<f64>,
    ) -> Result<Vec<Player>, GameError> {
        let players = self.store.all_players().await?;
        let index = ProximityIndex::new(players.iter().map(|p| (p.id, p.position)).collect());
        let ids = index.nearby(origin, radius_m);
        Ok(players
            .into_iter()
            .filter(|p| ids.contains(&p.id))
            .collect())
    }
}
