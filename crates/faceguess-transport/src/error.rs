/// Socket-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting on the listener failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The client's WebSocket upgrade request was missing or invalid.
    #[error("websocket upgrade failed: {0}")]
    UpgradeFailed(#[source] std::io::Error),

    /// The peer did not finish an operation in time. Carries its name.
    #[error("{0} timed out")]
    TimedOut(&'static str),

    /// An outbound frame was not valid UTF-8 and cannot go out as text.
    #[error("outbound frame is not valid UTF-8")]
    NotText,
}
