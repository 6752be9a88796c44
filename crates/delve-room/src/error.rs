//! Error types for the room layer.

use delve_protocol::PlayerId;
use delve_world::GameError;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Another player holds the lease.
    #[error("the treasure room is occupied by another player")]
    RoomBusy,

    /// The re-entry policy has no turn left for this player.
    #[error("you have already had your turn in the treasure room")]
    AlreadyUsed,

    /// The player does not hold the lease.
    #[error("player {0} is not in the treasure room")]
    NotInRoom(PlayerId),

    /// The lease and the world disagree about who is inside. Never caused
    /// by a client; indicates a locking bug.
    #[error("room lease conflict: {0} is inside without a lease")]
    LeaseConflict(PlayerId),

    /// The world refused the transition (not at the entrance, room closed,
    /// game over, ...).
    #[error(transparent)]
    World(#[from] GameError),
}
