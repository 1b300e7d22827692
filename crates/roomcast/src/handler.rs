//! Per-connection handler: register, read requests, route, clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection with the relay and start its writer task
//!   2. Loop: receive a frame → decode a `Request` → run the gateway under
//!      the relay lock → enqueue the reply
//!   3. On close, error, or idle timeout: leave every room, let the writer
//!      flush what is already queued, then close the socket
//!
//! The writer also pings the peer periodically. Any inbound frame, pongs
//! included, keeps the connection alive, so members that only listen are
//! not dropped.

use std::sync::Arc;
use std::time::Duration;

use roomcast_protocol::{Codec, Request, ServerFrame};
use roomcast_room::{ConnectionReceiver, ConnectionSender, outbound_channel};
use roomcast_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::RoomcastError;
use crate::server::ServerState;

/// How long the writer may keep flushing queued frames after the reader
/// has stopped.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Drop guard that removes a connection from the relay if the handler
/// exits without doing it.
///
/// Covers early returns and panics. Since `Drop` is synchronous, cleanup is
/// a fire-and-forget task that takes the lock.
struct DisconnectGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
    armed: bool,
}

impl<C: Codec> DisconnectGuard<C> {
    /// Cleanup already ran inline.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut relay = state.relay.lock().await;
            relay.on_disconnect(conn_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), RoomcastError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (tx, rx) = outbound_channel();
    state.relay.lock().await.connect(conn_id, tx.clone());
    let mut guard = DisconnectGuard {
        conn_id,
        state: Arc::clone(&state),
        armed: true,
    };

    let mut writer = tokio::spawn(write_frames(Arc::clone(&conn), Arc::clone(&state), rx));
    let result = read_requests(&conn, &state, &tx).await;

    // Dropping the last senders closes the queue: the writer flushes what
    // is already in it and exits.
    drop(tx);
    state.relay.lock().await.on_disconnect(conn_id);
    guard.disarm();

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        tracing::debug!(%conn_id, "writer did not drain in time");
        writer.abort();
    }
    let _ = conn.close().await;
    result
}

/// Reads requests until the peer goes away or sends nothing at all, not
/// even a pong, for the idle timeout.
async fn read_requests<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    tx: &ConnectionSender,
) -> Result<(), RoomcastError> {
    let conn_id = conn.id();

    loop {
        let remaining = state.config.idle_timeout.saturating_sub(conn.idle_for());
        let data = match tokio::time::timeout(remaining, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Err(e.into());
            }
            Err(_) if conn.idle_for() < state.config.idle_timeout => continue,
            Err(_) => {
                tracing::info!(%conn_id, "connection timed out");
                return Ok(());
            }
        };

        let request: Request = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                continue;
            }
        };

        handle_request(state, conn_id, &request, tx).await;
    }
}

/// Routes one request and enqueues its reply, if any.
async fn handle_request<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    request: &Request,
    tx: &ConnectionSender,
) {
    tracing::debug!(%conn_id, event = %request.event, ack = ?request.ack, "request");

    // The reply is enqueued under the lock, after any broadcast the request
    // caused, so the caller sees its own broadcast first.
    let mut relay = state.relay.lock().await;
    match state.gateway.dispatch(&mut relay, conn_id, request) {
        Ok(Some(reply)) => {
            if reply.is_error() {
                tracing::debug!(%conn_id, event = %request.event, ?reply, "request rejected");
            }
            let _ = tx.send(ServerFrame::reply(request.ack, reply));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "request ignored");
        }
    }
}

/// Drains the outbound queue onto the socket and pings the peer while the
/// queue is quiet. Exits once the queue is closed and empty.
async fn write_frames<K: Connection, C: Codec>(
    conn: Arc<K>,
    state: Arc<ServerState<C>>,
    mut rx: ConnectionReceiver,
) {
    let conn_id = conn.id();
    let mut keepalive = tokio::time::interval(ping_interval(state.config.idle_timeout));
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately.
    keepalive.tick().await;

    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let text = match state.codec.encode(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(%conn_id, error = %e, "failed to encode frame");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&text).await {
                    tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
                    break;
                }
            }
            _ = keepalive.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%conn_id, error = %e, "ping failed, stopping writer");
                    break;
                }
            }
        }
    }
}

/// Pings often enough that a healthy peer answers well within the idle
/// timeout.
fn ping_interval(idle_timeout: Duration) -> Duration {
    (idle_timeout / 3).max(Duration::from_millis(10))
}
