//! Connection registry: live connections, their outbound queues, and the
//! rooms each one has joined.

use std::collections::{HashMap, HashSet};

use roomcast_protocol::ServerFrame;
use roomcast_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering frames to one connection's writer task.
///
/// Unbounded so that enqueueing never blocks the relay lock; a slow client
/// only grows its own queue.
pub type ConnectionSender = mpsc::UnboundedSender<ServerFrame>;

/// The receiving half handed to the connection's writer task.
pub type ConnectionReceiver = mpsc::UnboundedReceiver<ServerFrame>;

/// Creates the outbound queue for a new connection.
pub fn outbound_channel() -> (ConnectionSender, ConnectionReceiver) {
    mpsc::unbounded_channel()
}

struct ConnectionEntry {
    sender: ConnectionSender,
    /// Index of joined rooms, so disconnect cleanup avoids scanning every
    /// room. Kept in sync with room membership by [`Relay`](crate::Relay).
    rooms: HashSet<String>,
}

/// Tracks every live connection.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and its outbound queue.
    ///
    /// Registering an id twice replaces the queue but keeps the room index.
    pub fn register(&mut self, id: ConnectionId, sender: ConnectionSender) {
        match self.connections.get_mut(&id) {
            Some(entry) => {
                tracing::warn!(%id, "connection registered twice, replacing sender");
                entry.sender = sender;
            }
            None => {
                self.connections.insert(
                    id,
                    ConnectionEntry {
                        sender,
                        rooms: HashSet::new(),
                    },
                );
            }
        }
    }

    /// Forgets a connection. Returns the rooms it had joined, or `None` if
    /// it was not registered (already removed, or never added).
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Vec<String>> {
        self.connections
            .remove(&id)
            .map(|entry| entry.rooms.into_iter().collect())
    }

    /// Notes that `id` joined `room`. No-op for unknown connections.
    pub fn record_join(&mut self, id: ConnectionId, room: &str) {
        if let Some(entry) = self.connections.get_mut(&id) {
            entry.rooms.insert(room.to_string());
        }
    }

    /// Notes that `id` left `room`. No-op for unknown connections.
    pub fn record_leave(&mut self, id: ConnectionId, room: &str) {
        if let Some(entry) = self.connections.get_mut(&id) {
            entry.rooms.remove(room);
        }
    }

    /// Rooms `id` has joined, in no particular order.
    pub fn rooms_of(&self, id: ConnectionId) -> Vec<String> {
        self.connections
            .get(&id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Enqueues a frame for one connection.
    ///
    /// Returns `false` if the connection is unknown or its writer has gone
    /// away. The frame is dropped in that case.
    pub fn send_to(&self, id: ConnectionId, frame: ServerFrame) -> bool {
        match self.connections.get(&id) {
            Some(entry) => entry.sender.send(frame).is_ok(),
            None => false,
        }
    }

    /// Whether `id` is registered.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
