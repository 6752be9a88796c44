//! # Delve
//!
//! A real-time multiplayer treasure hunt server.
//!
//! Players connect over a stream transport, receive a numeric id, and then
//! exchange one JSON command for one JSON response: look at the grid, move
//! around it picking up treasure, and take turns in an exclusive,
//! time-limited treasure room. When the last treasure is collected the
//! highest score wins (or several players tie).
//!
//! This crate wires the layers together:
//!
//! - `delve-transport` — line-framed TCP and WebSocket connections
//! - `delve-protocol` — [`Command`](prelude::Command) and
//!   [`Response`](prelude::Response) wire types, [`JsonCodec`](prelude::JsonCodec)
//! - `delve-world` — the authoritative grid world and its rules
//! - `delve-room` — the treasure room lease
//! - `delve-session` — the connected-player registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use delve::prelude::*;
//!
//! # async fn start() -> Result<(), DelveError> {
//! let server = DelveServer::builder()
//!     .bind("0.0.0.0:5000")
//!     .room_config(RoomConfig {
//!         reentry: ReentryPolicy::Once,
//!         ..RoomConfig::default()
//!     })
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod game;
mod handler;
mod server;

pub use error::DelveError;
pub use game::{Game, GameConfig};
pub use server::{DelveServer, DelveServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{DelveError, DelveServer, DelveServerBuilder, Game, GameConfig};
    pub use delve_protocol::{
        Codec, Command, Direction, JsonCodec, PlayerId, Position, Response, Tile, WorldView,
    };
    pub use delve_room::{ReentryPolicy, RoomConfig};
    pub use delve_session::SessionConfig;
    pub use delve_world::{Outcome, World, WorldConfig};
}
