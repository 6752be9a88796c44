//! The game: one world, one room arbiter, one session registry, and the
//! command dispatcher that ties them together.

use std::sync::Arc;

use delve_protocol::{Command, Direction, PlayerId, Position, Response};
use delve_room::{RoomArbiter, RoomConfig};
use delve_session::{SessionConfig, SessionRegistry};
use delve_world::{Outcome, Player, World, WorldConfig};
use tokio::sync::Mutex;

use crate::DelveError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Every setting a game needs, with the standard 8×8 defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub room: RoomConfig,
    pub session: SessionConfig,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Shared state for one game, handed to every connection task.
///
/// Owns the three lock domains: the room lock inside the [`RoomArbiter`],
/// the world lock around [`World`], and the session lock inside the
/// [`SessionRegistry`]. Nothing here holds a lock across a network send;
/// [`dispatch`](Self::dispatch) returns a finished [`Response`] and the
/// caller encodes and sends it afterwards.
#[derive(Debug)]
pub struct Game {
    world: Arc<Mutex<World>>,
    arbiter: Arc<RoomArbiter>,
    sessions: SessionRegistry,
}

impl Game {
    /// Generates a fresh world from `config`.
    ///
    /// # Errors
    /// Returns an error if any part of `config` is invalid.
    pub fn generate(config: GameConfig) -> Result<Self, DelveError> {
        let world = World::generate(&config.world)?;
        Self::with_world(world, config.room, config.session)
    }

    /// Wraps an already built world.
    pub fn with_world(
        world: World,
        room: RoomConfig,
        session: SessionConfig,
    ) -> Result<Self, DelveError> {
        Ok(Self {
            world: Arc::new(Mutex::new(world)),
            arbiter: Arc::new(RoomArbiter::new(room)),
            sessions: SessionRegistry::new(session)?,
        })
    }

    pub fn world(&self) -> &Arc<Mutex<World>> {
        &self.world
    }

    pub fn arbiter(&self) -> &Arc<RoomArbiter> {
        &self.arbiter
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// The final outcome, once every treasure has been collected.
    pub async fn outcome(&self) -> Option<Outcome> {
        self.world.lock().await.outcome().cloned()
    }

    // -- Lifecycle --------------------------------------------------------

    /// Registers a new player under a fresh random id.
    pub async fn connect(&self) -> Result<PlayerId, DelveError> {
        Ok(self.sessions.connect(&self.world).await?)
    }

    /// Registers a player under a caller-chosen id.
    pub async fn join(&self, player_id: PlayerId) -> Result<Position, DelveError> {
        Ok(self.sessions.add(&self.world, player_id).await?)
    }

    /// Removes a player, releasing the room if they hold it.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<Player, DelveError> {
        Ok(self
            .sessions
            .remove(&self.world, &self.arbiter, player_id)
            .await?)
    }

    // -- Commands ---------------------------------------------------------

    /// Runs one client command and builds the response.
    ///
    /// Once the game has ended every command except an unknown one is
    /// answered with the `game_over` response, including the move that
    /// collected the last treasure.
    pub async fn dispatch(&self, player_id: PlayerId, command: Command) -> Response {
        let name = command.name();
        let result = match command {
            Command::GetState => self.get_state(player_id).await,
            Command::Move { direction } => self.move_player(player_id, &direction).await,
            Command::EnterRoom => self
                .arbiter
                .enter(&self.world, player_id)
                .await
                .map(|state| Response::Success { state })
                .map_err(DelveError::from),
            Command::LeaveRoom => self
                .arbiter
                .leave(&self.world, player_id)
                .await
                .map(|state| Response::Success { state })
                .map_err(DelveError::from),
            Command::Unknown => {
                tracing::debug!(%player_id, "unknown command");
                return Response::invalid_command();
            }
        };

        match result {
            Ok(response) => response,
            Err(e) if e.is_game_over() => match self.outcome().await {
                Some(outcome) => Response::from(&outcome),
                None => Response::error(e.to_string()),
            },
            Err(e) => {
                tracing::debug!(%player_id, command = name, error = %e, "command rejected");
                Response::error(e.to_string())
            }
        }
    }

    async fn get_state(&self, player_id: PlayerId) -> Result<Response, DelveError> {
        let world = self.world.lock().await;
        if let Some(outcome) = world.outcome() {
            return Ok(Response::from(outcome));
        }
        Ok(Response::Ok(world.project(player_id)?))
    }

    async fn move_player(
        &self,
        player_id: PlayerId,
        direction: &str,
    ) -> Result<Response, DelveError> {
        let direction: Direction = direction.parse()?;

        let mut world = self.world.lock().await;
        let step = world.move_player(player_id, direction)?;
        if let Some(outcome) = world.outcome() {
            return Ok(Response::from(outcome));
        }
        if let Some(value) = step.treasure {
            tracing::debug!(%player_id, value, left = world.treasures_left(), "treasure picked up");
        }
        Ok(Response::Ok(world.project(player_id)?))
    }
}
