//! The lease record and the room's state machine.

use std::fmt;
use std::time::Duration;

use delve_protocol::PlayerId;
use tokio::time::Instant;

/// Exclusive, time-limited access to the treasure room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    pub occupant: PlayerId,
    pub granted_at: Instant,
    /// When the eviction timer fires.
    pub deadline: Instant,
    /// Bumped on every grant. A timer only evicts the lease it was armed
    /// for, so a late timer never touches a newer occupant.
    pub generation: u64,
}

impl Lease {
    /// How long the occupant has been inside.
    pub fn held_for(&self) -> Duration {
        self.granted_at.elapsed()
    }
}

/// `Free → Occupied → Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Free,
    Occupied(PlayerId),
}

impl RoomState {
    pub fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl From<Option<&Lease>> for RoomState {
    fn from(lease: Option<&Lease>) -> Self {
        match lease {
            Some(lease) => Self::Occupied(lease.occupant),
            None => Self::Free,
        }
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "Free"),
            Self::Occupied(player) => write!(f, "Occupied({player})"),
        }
    }
}
