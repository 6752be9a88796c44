//! The authoritative world-state engine for Delve.
//!
//! A [`World`] is plain synchronous data plus rules and takes no locks of
//! its own. The server wraps exactly one of them in a `tokio::sync::Mutex`
//! (the "world lock"); every operation here runs inside one critical
//! section, so a move, its treasure pickup, and the view built from the
//! result are observed together.
//!
//! # Key types
//!
//! - [`Grid`] / [`Cell`] — fixed-size cell arrays
//! - [`generate`] / [`Layout`] — random main grid + treasure room
//! - [`World`] — grids, players, counters; movement, projection, room
//!   transitions
//! - [`Outcome`] — the win detector's verdict

mod config;
mod error;
mod generator;
mod grid;
mod outcome;
mod world;

pub use config::WorldConfig;
pub use error::GameError;
pub use generator::{generate, Layout, ROOM_ENTRY};
pub use grid::{Cell, Grid};
pub use outcome::Outcome;
pub use world::{Location, Player, Step, World};
