//! Transport layer for Delve.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server loop is
//! written against, plus two implementations:
//!
//! - [`TcpTransport`] — newline-delimited frames over a plain TCP stream.
//!   This is what the terminal client speaks.
//! - [`WebSocketTransport`] — one frame per WebSocket message, for browser
//!   clients (behind the `websocket` feature, on by default).
//!
//! Both transports are strictly request/response from the server's point of
//! view: the server never pushes a frame the client did not ask for, except
//! the identity greeting sent right after accept.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

mod error;
mod tcp;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport, DEFAULT_MAX_FRAME};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter shared by every transport so ids stay unique per process.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Hands out the next process-wide connection id.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Methods return `impl Future + Send` rather than being plain `async fn`
/// so that a generic server can move connections into `tokio::spawn`ed
/// tasks.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// The address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A single connection that exchanges whole frames.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly
    /// (a zero-length read on TCP, a Close frame on WebSocket).
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// The remote address, for logging.
    fn peer_addr(&self) -> SocketAddr;
}
