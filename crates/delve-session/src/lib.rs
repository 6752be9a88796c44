//! Player session management for Delve.
//!
//! This crate tracks who is connected:
//!
//! 1. **Identity** — drawing a fresh random [`PlayerId`](delve_protocol::PlayerId)
//!    for each connection
//! 2. **Registration** — placing the player in the world and recording the
//!    session ([`SessionRegistry::connect`])
//! 3. **Removal** — deleting the player and releasing any room lease they
//!    hold ([`SessionRegistry::remove`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)         ← one task per connection calls connect/remove
//!     ↕
//! Session Layer (this crate)  ← session lock
//!     ↕
//! Room Arbiter / World   ← room lock, world lock
//! ```
//!
//! The session lock is only ever taken after the world lock has been
//! released, never inside it.

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{Session, SessionConfig};
