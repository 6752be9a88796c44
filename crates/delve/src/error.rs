//! Unified error type for Delve.

use delve_protocol::ProtocolError;
use delve_room::RoomError;
use delve_session::SessionError;
use delve_transport::TransportError;
use delve_world::GameError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DelveError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad direction).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A world rule refused the command.
    #[error(transparent)]
    World(#[from] GameError),

    /// The room arbiter refused the command.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Registration or removal failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl DelveError {
    /// Returns `true` if the command was refused only because the game
    /// has already ended.
    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            Self::World(GameError::GameOver) | Self::Room(RoomError::World(GameError::GameOver))
        )
    }
}
