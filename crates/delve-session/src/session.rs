//! Session types: the server's record of a connected player.

use std::ops::RangeInclusive;
use std::time::Instant;

use delve_protocol::PlayerId;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Player ids are drawn uniformly from this range.
    ///
    /// Default: `1000..=9999`.
    pub id_range: RangeInclusive<u64>,

    /// How many draws [`connect`](crate::SessionRegistry::connect) makes
    /// before giving up on finding a free id.
    pub max_id_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id_range: 1000..=9999,
            max_id_attempts: 64,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.id_range.is_empty() {
            return Err(SessionError::InvalidConfig(format!(
                "id range {:?} is empty",
                self.id_range
            )));
        }
        if self.max_id_attempts == 0 {
            return Err(SessionError::InvalidConfig(
                "max_id_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single connected player.
///
/// Lives from the moment the player is placed in the world until their
/// connection ends. There is no reconnection: a new connection is a new
/// player with a new id.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub connected_at: Instant,
}

impl Session {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            connected_at: Instant::now(),
        }
    }
}
