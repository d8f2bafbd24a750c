//! `FaceguessServer` builder and accept loop.
//!
//! This is the entry point for running a game server. It ties together
//! all the layers: transport → protocol → gateway → rooms.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use faceguess_protocol::{Codec, JsonCodec};
use faceguess_room::{Catalog, RoomConfig, RoomRegistry};
use faceguess_transport::{Transport, WebSocketTransport};

use crate::FaceguessError;
use crate::config::ServerConfig;
use crate::gateway::Gateway;
use crate::handler::handle_connection;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) gateway: Gateway,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use faceguess::prelude::*;
///
/// # async fn start() -> Result<(), FaceguessError> {
/// let server = FaceguessServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    catalog: Catalog,
    room_config: RoomConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            catalog: Catalog::default(),
            room_config: RoomConfig::default(),
        }
    }

    /// Applies a [`ServerConfig`], loading its item catalog.
    pub fn from_config(config: &ServerConfig) -> Result<Self, FaceguessError> {
        Ok(Self::new()
            .bind(&config.bind_addr())
            .catalog(config.catalog()?)
            .room_config(config.room.clone()))
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the items every room plays through.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets room limits and actor tuning.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` on the wire.
    pub async fn build(self) -> Result<FaceguessServer, FaceguessError> {
        self.build_with_codec(JsonCodec).await
    }

    /// Binds the listener with a custom codec.
    pub async fn build_with_codec<C: Codec>(
        self,
        codec: C,
    ) -> Result<FaceguessServer<C>, FaceguessError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let registry = RoomRegistry::new(self.catalog, self.room_config);

        let state = Arc::new(ServerState {
            gateway: Gateway::new(registry),
            codec,
        });

        Ok(FaceguessServer { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FaceguessServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl FaceguessServer {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }
}

impl<C: Codec> FaceguessServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), FaceguessError> {
        self.run_until(future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Connections already being served keep their tasks; only accepting
    /// stops.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), FaceguessError> {
        tracing::info!("faceguess server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutting down");
                    break;
                }
                incoming = next_client(&mut self.transport) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(incoming, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

/// Waits for the next client, pausing after a failed accept so a
/// persistent error such as descriptor exhaustion does not spin.
async fn next_client<T: Transport>(transport: &mut T) -> T::Incoming {
    loop {
        match transport.accept().await {
            Ok(incoming) => return incoming,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}
