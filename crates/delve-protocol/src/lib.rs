//! Wire protocol for Delve.
//!
//! - **Types** — [`Command`] (client → server), [`Response`] (server →
//!   client), and the [`WorldView`] snapshot embedded in responses.
//! - **Codec** — [`Codec`] trait and [`JsonCodec`].
//! - **Errors** — [`ProtocolError`].
//!
//! The protocol layer knows nothing about grids or locks. It only fixes
//! the shapes that travel on the wire:
//!
//! ```text
//! client: {"type":"move","direction":"left"}
//! server: {"status":"ok","grid":[...],"players":[...],"treasures_left":12,...}
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Command, Direction, PlayerId, Position, Response, Tile, VisiblePlayer, WorldView,
};
