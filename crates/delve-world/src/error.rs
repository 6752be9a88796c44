//! Error types for world operations.

use delve_protocol::PlayerId;

/// Why a world operation was refused.
///
/// Apart from [`DuplicateId`](Self::DuplicateId), which signals a bug in
/// id allocation, every variant is an ordinary rejected command: the world
/// is left exactly as it was and the message goes back to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No player with this id is registered in the world.
    #[error("player {0} not found")]
    UnknownPlayer(PlayerId),

    /// A player with this id is already registered.
    #[error("player {0} is already registered")]
    DuplicateId(PlayerId),

    /// The destination cell holds another player in the same grid.
    #[error("position occupied by another player")]
    PositionOccupied,

    /// There is no free cell left to spawn a new player on.
    #[error("no free cell left for a new player")]
    WorldFull,

    /// `enter_room` from anywhere but the entrance cell.
    #[error("you are not at the treasure room entrance")]
    NotAtEntrance,

    /// The room has been emptied and its entrance removed.
    #[error("the treasure room is closed")]
    RoomClosed,

    /// The player asked to leave a room they are not in.
    #[error("player {0} is not in the treasure room")]
    NotInRoom(PlayerId),

    /// Every treasure has been collected; the world no longer changes.
    #[error("game over")]
    GameOver,

    /// The configuration cannot produce a playable world.
    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),
}
