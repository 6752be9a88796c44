//! Error types for the session layer.

use delve_protocol::PlayerId;
use delve_world::GameError;

/// Errors that can occur while registering or removing players.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A session already exists for this id. Id allocation retries on
    /// this, so a client never sees it.
    #[error("player {0} already has a session")]
    DuplicateId(PlayerId),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// Every id drawn from the configured range was already taken.
    #[error("no free player id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    /// The configuration cannot produce ids.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The world refused to place the player (for example, no free cell).
    #[error(transparent)]
    World(GameError),
}

impl From<GameError> for SessionError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::DuplicateId(id) => Self::DuplicateId(id),
            other => Self::World(other),
        }
    }
}
