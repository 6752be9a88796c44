//! Treasure room access control for Delve.
//!
//! The room admits one player at a time for a fixed time limit. A
//! [`RoomArbiter`] owns the lease behind its own lock (the "room lock",
//! always taken before the world lock), arms a timer task per grant, and
//! evicts the occupant when it fires unless the lease has changed hands
//! in the meantime.
//!
//! # Key types
//!
//! - [`RoomArbiter`] — enter / leave / expire / forfeit
//! - [`Lease`] — who holds the room and until when
//! - [`RoomState`] — `Free` or `Occupied`
//! - [`RoomConfig`] / [`ReentryPolicy`] — time limit and re-entry rules

mod arbiter;
mod config;
mod error;
mod lease;

pub use arbiter::RoomArbiter;
pub use config::{ReentryPolicy, RoomConfig};
pub use error::RoomError;
pub use lease::{Lease, RoomState};
