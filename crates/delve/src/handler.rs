//! Per-connection handler: registration, greeting, and the command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register a new player under a fresh id
//!   2. Send the id as a plain decimal integer
//!   3. Loop: receive one command → dispatch → send one response
//!
//! Whatever ends the loop (clean close, socket error, malformed payload,
//! idle timeout), the player is removed from the game.

use std::sync::Arc;

use delve_protocol::{Codec, Command, PlayerId, Response};
use delve_transport::Connection;

use crate::server::ServerState;
use crate::DelveError;

/// Drop guard that removes the player when the handler exits.
///
/// Runs even if the handler panics. Since `Drop` is synchronous, the
/// async removal is spawned as a fire-and-forget task.
struct SessionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = state.game.disconnect(player_id).await {
                tracing::debug!(%player_id, error = %e, "disconnect cleanup failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Conn, C>(
    conn: Conn,
    state: Arc<ServerState<C>>,
) -> Result<(), DelveError>
where
    Conn: Connection,
    C: Codec,
{
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    let player_id = match state.game.connect().await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(%conn_id, error = %e, "could not register player");
            let bytes = state.codec.encode(&Response::error(e.to_string()))?;
            let _ = conn.send(&bytes).await;
            let _ = conn.close().await;
            return Err(e);
        }
    };
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, %peer, "player connected");

    conn.send(player_id.0.to_string().as_bytes()).await?;

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle for too long");
                break;
            }
        };

        let command: Command = match state.codec.decode(&data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "payload is not JSON, dropping client");
                break;
            }
        };

        // The response is fully built, and every lock released, before
        // anything touches the socket.
        let response = state.game.dispatch(player_id, command).await;
        let bytes = state.codec.encode(&response)?;
        conn.send(&bytes).await?;
    }

    let _ = conn.close().await;
    // _guard drops here → player removal fires.
    Ok(())
}
