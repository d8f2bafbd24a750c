//! Transport abstraction layer for Faceguess.
//!
//! Provides the [`Transport`] and [`Connection`] traits that hide the
//! concrete socket type from the gateway. Every live connection gets an
//! ephemeral [`ConnectionId`]; it is the only identity a client has.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{IncomingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a live connection.
///
/// Serialized as a plain number so clients can match roster entries
/// against their own id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out one pending client at a time.
///
/// `accept` returns as soon as the socket is accepted. Any protocol
/// handshake belongs to the returned `Incoming` value and is run by the
/// caller on the client's own task, so a silent peer never holds up the
/// listener.
pub trait Transport: Send + Sync + 'static {
    type Incoming: Send + 'static;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;
}

/// A single bidirectional message channel.
///
/// `send` and `recv` must be usable concurrently from different tasks:
/// the gateway reads on one task while a writer task drains the
/// connection's outbound queue.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next data frame, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
