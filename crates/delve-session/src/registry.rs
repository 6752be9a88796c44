//! The session registry: tracks every connected player.
//!
//! # Locking
//!
//! The registry owns the session lock. Registration takes the world lock,
//! places the player, releases it, and only then takes the session lock.
//! Removal goes through [`RoomArbiter::forfeit`] (room, then world), and
//! again takes the session lock afterwards. The session lock is therefore
//! never held together with the world lock.

use std::collections::HashMap;

use delve_protocol::{PlayerId, Position};
use delve_room::RoomArbiter;
use delve_world::{Player, World};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{Session, SessionConfig, SessionError};

/// Manages all connected player sessions.
///
/// ```text
/// connect() ──→ allocate id ──→ add() ──→ [Connected] ──→ remove()
///                    ↑             │
///                    └─ DuplicateId┘
/// ```
#[derive(Debug)]
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: Mutex<HashMap<PlayerId, Session>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] for an empty id range.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Draws a random id from the configured range. Not checked for
    /// uniqueness; [`add`](Self::add) does that.
    pub fn allocate_id(&self) -> PlayerId {
        PlayerId(rand::rng().random_range(self.config.id_range.clone()))
    }

    /// Places `player_id` on a random free cell and records the session.
    ///
    /// # Errors
    /// - [`SessionError::DuplicateId`] if the id is already in use.
    /// - [`SessionError::World`] if the world has no free cell.
    pub async fn add(
        &self,
        world: &Mutex<World>,
        player_id: PlayerId,
    ) -> Result<Position, SessionError> {
        if self.sessions.lock().await.contains_key(&player_id) {
            return Err(SessionError::DuplicateId(player_id));
        }

        let mut guard = world.lock().await;
        let position = guard.spawn_player(player_id, &mut rand::rng())?;
        drop(guard);

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&player_id) {
            // Lost a race with another add for the same id. Undo the spawn
            // without holding the session lock.
            drop(sessions);
            tracing::error!(%player_id, "duplicate session after spawn, rolling back");
            world.lock().await.remove_player(player_id);
            return Err(SessionError::DuplicateId(player_id));
        }
        sessions.insert(player_id, Session::new(player_id));
        let online = sessions.len();
        drop(sessions);

        tracing::info!(%player_id, %position, online, "player joined");
        Ok(position)
    }

    /// Allocates a fresh id and registers it, retrying on collisions.
    ///
    /// # Errors
    /// - [`SessionError::IdSpaceExhausted`] if every draw collided.
    /// - [`SessionError::World`] if the world has no free cell.
    pub async fn connect(&self, world: &Mutex<World>) -> Result<PlayerId, SessionError> {
        let attempts = self.config.max_id_attempts;
        for _ in 0..attempts {
            let player_id = self.allocate_id();
            match self.add(world, player_id).await {
                Ok(_) => return Ok(player_id),
                Err(SessionError::DuplicateId(_)) => {
                    tracing::debug!(%player_id, "player id collision, drawing again");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SessionError::IdSpaceExhausted { attempts })
    }

    /// Deletes a player's session and their world state, releasing the
    /// room lease if they hold it. Returns the player's final state.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the player was not registered.
    pub async fn remove(
        &self,
        world: &Mutex<World>,
        arbiter: &RoomArbiter,
        player_id: PlayerId,
    ) -> Result<Player, SessionError> {
        let removed = arbiter.forfeit(world, player_id).await;
        let session = self.sessions.lock().await.remove(&player_id);

        match (removed, session) {
            (Some(player), Some(session)) => {
                tracing::info!(
                    %player_id,
                    score = player.score,
                    connected_for = ?session.connected_at.elapsed(),
                    "player left"
                );
                Ok(player)
            }
            (Some(player), None) => {
                tracing::error!(%player_id, "player was in the world without a session");
                Ok(player)
            }
            (None, _) => Err(SessionError::NotFound(player_id)),
        }
    }

    pub async fn contains(&self, player_id: PlayerId) -> bool {
        self.sessions.lock().await.contains_key(&player_id)
    }

    /// Returns the number of connected players.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Lists all connected player ids.
    pub async fn ids(&self) -> Vec<PlayerId> {
        self.sessions.lock().await.keys().copied().collect()
    }
}
