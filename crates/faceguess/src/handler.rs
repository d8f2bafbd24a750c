//! Per-connection handler: upgrade, frame decoding, dispatch, and cleanup.
//!
//! Each accepted socket gets its own Tokio task running this handler
//! plus a writer task that drains the connection's outbound channel:
//!   1. Complete the WebSocket upgrade, bounded by `HANDSHAKE_TIMEOUT`
//!   2. Spawn the writer: encode each `ServerEvent` and send it as a frame
//!   3. Loop: receive frames → decode `ClientEvent` → `Gateway::handle`
//!   4. On close, error, or a stalled writer, the guard removes the
//!      connection from its room

use std::sync::Arc;
use std::time::Duration;

use faceguess_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use faceguess_room::ClientSender;
use faceguess_transport::{Connection, IncomingWebSocket, TransportError, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::FaceguessError;
use crate::server::ServerState;

/// Events queued for one connection before rooms start dropping them.
pub(crate) const OUTBOX_CAPACITY: usize = 256;

/// How long a client may take to send its upgrade request.
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long one frame may take to leave before the client is dropped.
pub(crate) const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Drop guard that takes a connection out of its room when the handler
/// exits, including on panic. `Drop` is synchronous, so the async cleanup
/// runs in a spawned task.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    writer: AbortHandle,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.writer.abort();
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.gateway.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    incoming: IncomingWebSocket,
    state: Arc<ServerState<C>>,
) -> Result<(), FaceguessError> {
    let peer = incoming.peer_addr();
    let conn = tokio::time::timeout(HANDSHAKE_TIMEOUT, incoming.upgrade())
        .await
        .map_err(|_| TransportError::TimedOut("websocket upgrade"))??;

    let conn_id = conn.id();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
    let mut writer = tokio::spawn(write_events(Arc::clone(&conn), Arc::clone(&state), rx));
    let _guard = ConnectionGuard {
        conn_id,
        writer: writer.abort_handle(),
        state: Arc::clone(&state),
    };

    loop {
        let frame = tokio::select! {
            frame = conn.recv() => frame,
            // The writer only finishes early when the client stopped reading
            // or the socket failed.
            finished = &mut writer => {
                return match finished {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(%conn_id, error = %e, "writer task failed");
                        Ok(())
                    }
                };
            }
        };

        let data = match frame {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                if let Err(close_err) = conn.close().await {
                    tracing::debug!(%conn_id, error = %close_err, "close failed");
                }
                return Err(e.into());
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                report(&tx, conn_id, format!("invalid message: {e}"));
                continue;
            }
        };

        if let Err(e) = state.gateway.handle(conn_id, &tx, event).await {
            report(&tx, conn_id, e.to_string());
        }
    }

    // _guard drops here → room leave fires.
    Ok(())
}

/// Queues a private `error` event for the connection.
fn report(tx: &ClientSender, conn_id: ConnectionId, message: String) {
    if tx.try_send(ServerEvent::Error { message }).is_err() {
        tracing::debug!(%conn_id, "outbound queue full, error event dropped");
    }
}

/// Sends every event queued for one connection, in order.
///
/// Stops with an error when encoding fails, the socket fails, or a frame
/// cannot be sent within `SEND_TIMEOUT`.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::Receiver<ServerEvent>,
) -> Result<(), FaceguessError> {
    let conn_id = conn.id();
    while let Some(event) = rx.recv().await {
        let bytes = state.codec.encode(&event).inspect_err(|e| {
            tracing::error!(%conn_id, error = %e, "failed to encode event");
        })?;
        tokio::time::timeout(SEND_TIMEOUT, conn.send(&bytes))
            .await
            .map_err(|_| {
                tracing::warn!(%conn_id, "client stopped reading, dropping connection");
                TransportError::TimedOut("send")
            })??;
    }
    Ok(())
}
