//! Room configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings for the treasure room's lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How long a lease lasts before the occupant is forced out.
    pub time_limit: Duration,

    /// Whether a player may come back after their first visit.
    pub reentry: ReentryPolicy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            reentry: ReentryPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReentryPolicy
// ---------------------------------------------------------------------------

/// How many turns in the treasure room a player gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Any number of visits, one at a time.
    #[default]
    Unlimited,
    /// A single visit per player for the lifetime of their session.
    Once,
}

impl ReentryPolicy {
    /// Returns `true` if a player with `previous_visits` completed or
    /// ongoing visits may enter again.
    pub fn allows(self, previous_visits: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Once => previous_visits == 0,
        }
    }
}

impl fmt::Display for ReentryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Once => write!(f, "once"),
        }
    }
}

impl FromStr for ReentryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unlimited" => Ok(Self::Unlimited),
            "once" => Ok(Self::Once),
            other => Err(format!("unknown re-entry policy {other:?} (expected unlimited or once)")),
        }
    }
}
