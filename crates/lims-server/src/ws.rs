//! `WebSocket` connection lifecycle.
//!
//! Clients connect to `GET /` (or `GET /ws`) on the message port. Each
//! connection runs as a small actor:
//!
//! - a writer task owns the socket sink and drains the connection's
//!   outbound queue, which the [`BroadcastHub`](crate::hub::BroadcastHub)
//!   feeds;
//! - the reader loop hands every text frame to the
//!   [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! A frame that fails to decode or handle is logged and dropped; the
//! connection stays open. The connection leaves the hub when the client
//! closes it or the socket errors. The writer then flushes whatever the
//! socket still accepts and completes the close handshake.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt as _, StreamExt as _};
use lims_types::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::ServerMessage;
use crate::state::AppState;

/// Upper bound on flushing a closing connection's queued frames.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /`, `GET /ws`
pub async fn ws_connect(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, state, peer))
}

/// Drive one connection from open to close.
async fn run_connection(socket: WebSocket, state: Arc<AppState>, peer: SocketAddr) {
    let id = ConnectionId::new();
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    // Queue the greeting before registering so no broadcast can overtake it.
    if tx.send(ServerMessage::welcome().encode()).is_err() {
        return;
    }
    state.hub.register(id, Some(peer), tx);
    info!(connection = %id, %peer, open = state.hub.len(), "New connection");

    let mut writer = tokio::spawn(writer_task(sink, rx, id));

    while let Some(received) = stream.next().await {
        match received {
            Ok(Message::Text(text)) => {
                if let Err(e) = state.dispatcher.dispatch(id, text.as_str()).await {
                    warn!(connection = %id, error = %e, "Dropping request");
                }
            }
            Ok(Message::Close(frame)) => {
                debug!(connection = %id, reason = ?frame, "Client initiated close");
                break;
            }
            Ok(Message::Binary(data)) => {
                debug!(connection = %id, len = data.len(), "Ignoring binary frame");
            }
            // axum's socket (tungstenite underneath) queues the pong reply
            // itself when it reads a ping.
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                warn!(connection = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // The hub held the only sender; once it is gone the writer drains
    // what is already queued and closes the sink.
    state.hub.unregister(id);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        debug!(connection = %id, "Writer did not drain in time");
        writer.abort();
    }
    info!(connection = %id, %peer, open = state.hub.len(), "Connection closed");
    if state.hub.is_empty() {
        debug!("No open connections");
    }
}

/// Forward queued frames to the socket until the queue closes or a send
/// fails, then close the sink so a pending close handshake is flushed.
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<String>,
    id: ConnectionId,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = sink.send(Message::Text(frame.into())).await {
            debug!(connection = %id, error = %e, "WebSocket send failed");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!(connection = %id, error = %e, "WebSocket close failed");
    }
}
