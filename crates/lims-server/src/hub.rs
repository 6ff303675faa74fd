//! Broadcast hub: the set of open connections.
//!
//! Each open connection is represented by the sending half of an
//! unbounded channel. A per-connection writer task (see [`crate::ws`])
//! owns the receiving half and the socket sink, so pushing a frame here
//! never waits on the network and frames reach each client in the order
//! they were pushed.
//!
//! Delivery failures are per connection: a closed writer is pruned and
//! logged, and every other connection still receives the frame.

use std::net::SocketAddr;

use dashmap::DashMap;
use lims_types::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::protocol::ServerMessage;

/// Sending half of a connection's outbound frame queue.
pub type FrameSender = mpsc::UnboundedSender<String>;

/// The outbound side of the dispatcher.
///
/// Replies go to the requesting connection; published changes go to
/// everyone. Swapping the implementation (in-process fan-out, external
/// pub/sub, a test recorder) does not touch the handlers.
pub trait Notifier: Send + Sync {
    /// Deliver a response to the connection that sent the request.
    fn reply(&self, origin: ConnectionId, message: &ServerMessage);

    /// Publish a change notification to every open connection.
    fn publish(&self, message: &ServerMessage);
}

struct ConnectionHandle {
    peer: Option<SocketAddr>,
    tx: FrameSender,
}

/// Registry of open connections keyed by [`ConnectionId`].
#[derive(Default)]
pub struct BroadcastHub {
    connections: DashMap<ConnectionId, ConnectionHandle>,
}

impl BroadcastHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns `false` if `id` was already registered,
    /// in which case the existing entry is kept.
    pub fn register(&self, id: ConnectionId, peer: Option<SocketAddr>, tx: FrameSender) -> bool {
        let mut inserted = false;
        self.connections.entry(id).or_insert_with(|| {
            inserted = true;
            ConnectionHandle { peer, tx }
        });
        debug!(connection = %id, inserted, open = self.connections.len(), "Connection registered");
        inserted
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id);
        if let Some((_, handle)) = &removed {
            debug!(
                connection = %id,
                peer = ?handle.peer,
                open = self.connections.len(),
                "Connection unregistered"
            );
        }
        removed.is_some()
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is open.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queue a frame for exactly one connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnknownConnection`] if `id` is not
    /// registered, or [`TransportError::Closed`] if its writer has shut
    /// down (the entry is then removed).
    pub fn send_to(&self, id: ConnectionId, message: &ServerMessage) -> Result<(), TransportError> {
        let sent = self
            .connections
            .get(&id)
            .ok_or(TransportError::UnknownConnection(id))?
            .tx
            .send(message.encode());

        if sent.is_err() {
            self.unregister(id);
            return Err(TransportError::Closed(id));
        }
        Ok(())
    }

    /// Queue a frame for every registered connection.
    ///
    /// Connections whose writer has shut down are skipped and removed.
    /// Returns the number of connections the frame was queued for.
    pub fn broadcast_all(&self, message: &ServerMessage) -> usize {
        let frame = message.encode();
        let mut delivered: usize = 0;
        let mut closed = Vec::new();

        for entry in &self.connections {
            if entry.value().tx.send(frame.clone()).is_ok() {
                delivered = delivered.saturating_add(1);
            } else {
                closed.push(*entry.key());
            }
        }

        // Removal happens after iteration; DashMap shards are locked
        // while an iterator holds them.
        for id in closed {
            warn!(connection = %id, kind = message.kind(), "Dropping closed connection during broadcast");
            self.unregister(id);
        }

        debug!(kind = message.kind(), delivered, "Broadcast sent");
        delivered
    }
}

impl Notifier for BroadcastHub {
    fn reply(&self, origin: ConnectionId, message: &ServerMessage) {
        if let Err(e) = self.send_to(origin, message) {
            warn!(connection = %origin, kind = message.kind(), error = %e, "Reply not delivered");
        }
    }

    fn publish(&self, message: &ServerMessage) {
        self.broadcast_all(message);
    }
}
