//! `DelveServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → game.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use delve_protocol::{Codec, JsonCodec};
use delve_room::RoomConfig;
use delve_session::SessionConfig;
use delve_transport::{TcpTransport, Transport, DEFAULT_MAX_FRAME};
#[cfg(feature = "websocket")]
use delve_transport::WebSocketTransport;
use delve_world::{World, WorldConfig};

use crate::handler::handle_connection;
use crate::{DelveError, Game, GameConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) game: Game,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Delve server.
///
/// # Example
///
/// ```rust,no_run
/// use delve::prelude::*;
///
/// # async fn start() -> Result<(), DelveError> {
/// let server = DelveServer::builder()
///     .bind("0.0.0.0:5000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DelveServerBuilder {
    bind_addr: String,
    idle_timeout: Duration,
    max_frame: usize,
    config: GameConfig,
    world: Option<World>,
}

impl DelveServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            idle_timeout: Duration::from_secs(300),
            max_frame: DEFAULT_MAX_FRAME,
            config: GameConfig::default(),
            world: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Drops clients that send nothing for this long.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Largest accepted frame on the TCP transport.
    pub fn max_frame(mut self, bytes: usize) -> Self {
        self.max_frame = bytes;
        self
    }

    pub fn world_config(mut self, config: WorldConfig) -> Self {
        self.config.world = config;
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Serves this world instead of generating one.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Builds the server on line-framed TCP with `JsonCodec`.
    pub async fn build(self) -> Result<DelveServer<TcpTransport, JsonCodec>, DelveError> {
        let transport = TcpTransport::bind(&self.bind_addr)
            .await?
            .with_max_frame(self.max_frame);
        self.build_with(transport)
    }

    /// Builds the server on WebSocket with `JsonCodec`.
    #[cfg(feature = "websocket")]
    pub async fn build_websocket(
        self,
    ) -> Result<DelveServer<WebSocketTransport, JsonCodec>, DelveError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        self.build_with(transport)
    }

    /// Builds the server on an already bound transport.
    pub fn build_with<T: Transport>(
        self,
        transport: T,
    ) -> Result<DelveServer<T, JsonCodec>, DelveError> {
        let game = match self.world {
            Some(world) => Game::with_world(world, self.config.room, self.config.session)?,
            None => Game::generate(self.config)?,
        };

        let state = Arc::new(ServerState {
            game,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(DelveServer { transport, state })
    }
}

impl Default for DelveServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Delve game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DelveServer<T: Transport, C: Codec> {
    transport: T,
    state: Arc<ServerState<C>>,
}

impl DelveServer<TcpTransport, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DelveServerBuilder {
        DelveServerBuilder::new()
    }
}

impl<T: Transport, C: Codec> DelveServer<T, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The game this server runs.
    pub fn game(&self) -> &Game {
        &self.state.game
    }

    /// Runs the accept loop.
    ///
    /// Spawns one handler task per connection. A failed accept is logged
    /// and the loop carries on. Runs until the task is dropped.
    pub async fn run(mut self) -> Result<(), DelveError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Delve server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
