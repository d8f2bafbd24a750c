//! Unified error type for the Faceguess server.

use faceguess_protocol::ProtocolError;
use faceguess_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically. Refused room operations never surface here:
/// they become `error` events for the client that sent them.
#[derive(Debug, thiserror::Error)]
pub enum FaceguessError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Startup configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
