//! Types that travel on the wire.
//!
//! Everything here derives `Serialize`/`Deserialize`; the serde attributes
//! pin the exact JSON shapes the terminal client expects, and the tests at
//! the bottom of the file hold them in place.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity and geometry
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Serialized as a bare number (`#[serde(transparent)]`), which is also
/// what the server writes as its greeting right after accept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A cell coordinate inside whichever grid the player currently occupies.
///
/// Row 0 is the top edge, column 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One orthogonal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Row and column deltas for this step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

impl FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ProtocolError::InvalidDirection(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Command — client → server
// ---------------------------------------------------------------------------

/// A request from a client. Internally tagged on `type`:
///
/// ```text
/// {"type":"get_state"}
/// {"type":"move","direction":"up"}
/// {"type":"enter_room"}
/// {"type":"leave_room"}
/// ```
///
/// Decoding only fails on input that is not JSON at all. Any other value
/// decodes: a missing, non-string, or unrecognized tag, or a payload that
/// is not an object, becomes [`Command::Unknown`]. `direction` stays a
/// string so that a bad value becomes a rejected move; a missing or
/// non-string direction decodes as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    GetState,
    Move { direction: String },
    EnterRoom,
    LeaveRoom,
    Unknown,
}

/// A JSON value that is kept only when it is a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Field {
    Text(String),
    Other(IgnoredAny),
}

impl Field {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Other(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Frame {
    Object(BTreeMap<String, Field>),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Frame::Object(mut fields) = Frame::deserialize(deserializer)? else {
            return Ok(Self::Unknown);
        };
        let tag = fields.remove("type").and_then(Field::into_text);
        let command = match tag.as_deref() {
            Some("get_state") => Self::GetState,
            Some("move") => Self::Move {
                direction: fields
                    .remove("direction")
                    .and_then(Field::into_text)
                    .unwrap_or_default(),
            },
            Some("enter_room") => Self::EnterRoom,
            Some("leave_room") => Self::LeaveRoom,
            _ => Self::Unknown,
        };
        Ok(command)
    }
}

impl Command {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetState => "get_state",
            Self::Move { .. } => "move",
            Self::EnterRoom => "enter_room",
            Self::LeaveRoom => "leave_room",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// WorldView — the per-player snapshot
// ---------------------------------------------------------------------------

/// What a single grid cell looks like to the viewing player.
///
/// Player markers are overlaid on top of the terrain: the viewer's own
/// cell shows [`Tile::You`], other visible players show [`Tile::Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tile {
    Empty,
    Treasure { value: u32 },
    Entrance,
    You,
    Player { id: PlayerId },
}

/// A player visible to the viewer (same grid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisiblePlayer {
    pub id: PlayerId,
    pub position: Position,
    pub score: u32,
    pub is_you: bool,
}

/// The filtered snapshot of the world one player is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldView {
    /// Rows of tiles of the grid the viewer is in, players overlaid.
    pub grid: Vec<Vec<Tile>>,
    /// Players in the same grid as the viewer, the viewer included.
    pub players: Vec<VisiblePlayer>,
    /// Treasures not yet collected anywhere in the world.
    pub treasures_left: u32,
    /// Treasures still lying in the treasure room.
    pub room_treasures_left: u32,
    pub in_room: bool,
    /// The viewer's own score.
    pub score: u32,
}

impl WorldView {
    /// The tile at `pos`, if it is inside the grid.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        self.grid.get(pos.row)?.get(pos.col).copied()
    }

    /// The viewer's own entry in [`players`](Self::players).
    pub fn me(&self) -> Option<&VisiblePlayer> {
        self.players.iter().find(|p| p.is_you)
    }
}

// ---------------------------------------------------------------------------
// Response — server → client
// ---------------------------------------------------------------------------

/// Exactly one of these is sent back per [`Command`]. Tagged on `status`:
///
/// - `ok` — the `WorldView` fields, flattened (answer to `get_state`/`move`)
/// - `success` — `{"state": WorldView}` (answer to `enter_room`/`leave_room`)
/// - `error` — `{"message": "..."}`, the command was rejected
/// - `game_over` — every treasure is collected; `winner` is `null` on a tie
///   and `tied` then lists everyone sharing the top score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok(WorldView),
    Success {
        state: WorldView,
    },
    Error {
        message: String,
    },
    GameOver {
        winner: Option<PlayerId>,
        tied: Vec<PlayerId>,
        score: u32,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The reply to a tag the server does not understand.
    pub fn invalid_command() -> Self {
        Self::error("invalid command")
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The embedded view, for both `ok` and `success` replies.
    pub fn view(&self) -> Option<&WorldView> {
        match self {
            Self::Ok(view) | Self::Success { state: view } => Some(view),
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
