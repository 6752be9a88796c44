//! Newline-framed TCP transport.
//!
//! Each frame is one line: the payload bytes followed by `\n` (a trailing
//! `\r` is tolerated). Payloads are JSON, which never contains a raw
//! newline, so no escaping is needed.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Frame limit used unless the server overrides it.
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024;

/// A TCP [`Transport`] producing line-framed connections.
pub struct TcpTransport {
    listener: TcpListener,
    max_frame: usize,
}

impl TcpTransport {
    /// Binds a listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self {
            listener,
            max_frame: DEFAULT_MAX_FRAME,
        })
    }

    /// Caps the size of a single inbound frame.
    pub fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    async fn accept(&mut self) -> Result<TcpConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %e, "could not set TCP_NODELAY");
        }

        let id = ConnectionId::next();
        tracing::debug!(%id, %peer, "accepted TCP connection");

        let (read, write) = stream.into_split();
        Ok(TcpConnection {
            id,
            peer,
            max_frame: self.max_frame,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// One accepted TCP client.
///
/// Read and write halves sit behind separate locks so a pending `recv`
/// never blocks a `send`.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    max_frame: usize,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
}

impl Connection for TcpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        writer
            .write_all(b"\n")
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut line = Vec::new();
            // Read at most one byte past the limit so an oversize frame is
            // detected without buffering all of it.
            let limit = self.max_frame as u64 + 1;
            let n = (&mut *reader)
                .take(limit)
                .read_until(b'\n', &mut line)
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                return Ok(None);
            }

            if line.last() == Some(&b'\n') {
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
            } else if line.len() > self.max_frame {
                return Err(TransportError::FrameTooLarge {
                    max: self.max_frame,
                });
            }

            if line.is_empty() {
                continue;
            }
            return Ok(Some(line));
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
