//! The relay: one owned object holding the room store and the connection
//! registry, with the join/leave/message operations that touch both.
//!
//! Every operation validates first and mutates second, so a failed request
//! leaves no partial state. Broadcasts are enqueued only after the
//! membership change they describe has been applied.

use roomcast_protocol::{ChatMessage, RoomEvent};
use roomcast_transport::ConnectionId;

use crate::{
    BroadcastDispatcher, ConnectionRegistry, ConnectionSender, RoomError, RoomStore,
    RoomSummary,
};

/// Username shown in the `roomLeft` notice when a connection drops without
/// leaving. The client is gone, so nobody can supply a real name.
pub const DISCONNECTED_USERNAME: &str = "(disconnected)";

/// Text of the `roomJoined` broadcast.
pub fn joined_notice(username: &str, id: ConnectionId, room: &str) -> String {
    format!("User {username} ({id}) joined room {room}")
}

/// Text of the `roomLeft` broadcast.
pub fn left_notice(username: &str, id: ConnectionId, room: &str) -> String {
    format!("User {username} ({id}) left room {room}")
}

/// All relay state for one process.
///
/// Not thread-safe by itself; the server shares one instance behind a
/// mutex and each request holds the lock for its whole validate, mutate,
/// broadcast sequence.
#[derive(Default)]
pub struct Relay {
    rooms: RoomStore,
    connections: ConnectionRegistry,
}

impl Relay {
    /// Creates an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live connection and the queue its frames go to.
    pub fn connect(&mut self, id: ConnectionId, sender: ConnectionSender) {
        self.connections.register(id, sender);
        tracing::debug!(%id, connections = self.connections.len(), "connection registered");
    }

    /// Creates a room. No broadcast.
    pub fn create_room(
        &mut self,
        name: &str,
        password: Option<String>,
    ) -> Result<(), RoomError> {
        self.rooms.create_room(name, password)
    }

    /// Adds `id` to `room` and broadcasts `roomJoined` to the room,
    /// including the joiner.
    ///
    /// Joining a room the connection is already in succeeds again and
    /// broadcasts again.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room does not exist
    /// - [`RoomError::InvalidPassword`] if the password check fails
    pub fn join_room(
        &mut self,
        id: ConnectionId,
        room: &str,
        username: &str,
        password: Option<&str>,
    ) -> Result<(), RoomError> {
        let target = self.rooms.get_room(room).ok_or_else(|| RoomError::NotFound {
            room: room.to_string(),
        })?;
        if !target.check_password(password) {
            tracing::debug!(%id, %room, "join rejected: invalid password");
            return Err(RoomError::InvalidPassword {
                room: room.to_string(),
            });
        }

        self.rooms.add_member(room, id)?;
        self.connections.record_join(id, room);
        tracing::info!(
            %id,
            %room,
            %username,
            members = self.member_count(room),
            "joined room"
        );

        self.broadcast(room, RoomEvent::RoomJoined(joined_notice(username, id, room)));
        Ok(())
    }

    /// Removes `id` from `room` and broadcasts `roomLeft` to the remaining
    /// members.
    ///
    /// Leaving a room the connection is not in still succeeds and still
    /// broadcasts.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn leave_room(
        &mut self,
        id: ConnectionId,
        room: &str,
        username: &str,
    ) -> Result<(), RoomError> {
        self.rooms.remove_member(room, id)?;
        self.connections.record_leave(id, room);
        tracing::info!(
            %id,
            %room,
            %username,
            members = self.member_count(room),
            "left room"
        );

        self.broadcast(room, RoomEvent::RoomLeft(left_notice(username, id, room)));
        Ok(())
    }

    /// Broadcasts a chat message to `room`.
    ///
    /// The sender does not have to be a member. Returns how many members
    /// the message was enqueued for.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn send_message(
        &self,
        room: &str,
        username: &str,
        message: &str,
    ) -> Result<usize, RoomError> {
        if self.rooms.get_room(room).is_none() {
            return Err(RoomError::NotFound {
                room: room.to_string(),
            });
        }
        Ok(self.broadcast(
            room,
            RoomEvent::Message(ChatMessage {
                sender: username.to_string(),
                message: message.to_string(),
            }),
        ))
    }

    /// Snapshot of every room.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.list_rooms()
    }

    /// Cleans up after a connection that went away.
    ///
    /// Removes it from every room it was in, broadcasts `roomLeft` (with
    /// [`DISCONNECTED_USERNAME`]) to each of those rooms, and forgets the
    /// connection. Safe to call repeatedly and for ids that never joined
    /// anything. Returns the rooms that were cleaned.
    pub fn on_disconnect(&mut self, id: ConnectionId) -> Vec<String> {
        let mut rooms = match self.connections.unregister(id) {
            Some(rooms) => rooms,
            // Not registered: fall back to scanning for stray memberships.
            None => self.rooms.rooms_containing(id),
        };
        rooms.sort();

        for room in &rooms {
            if self.rooms.remove_member(room, id).is_ok() {
                self.broadcast(
                    room,
                    RoomEvent::RoomLeft(left_notice(DISCONNECTED_USERNAME, id, room)),
                );
            }
        }

        tracing::info!(
            %id,
            rooms = rooms.len(),
            connections = self.connections.len(),
            "connection cleaned up"
        );
        rooms
    }

    /// Read access to the room store.
    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    /// Read access to the connection registry.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    fn broadcast(&self, room: &str, event: RoomEvent) -> usize {
        BroadcastDispatcher::new(&self.rooms, &self.connections).broadcast(room, event)
    }

    fn member_count(&self, room: &str) -> usize {
        self.rooms.get_room(room).map_or(0, |r| r.member_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_formats() {
        let id = ConnectionId::new(4);
        assert_eq!(
            joined_notice("alice", id, "lobby"),
            "User alice (conn-4) joined room lobby"
        );
        assert_eq!(
            left_notice("alice", id, "lobby"),
            "User alice (conn-4) left room lobby"
        );
    }

    #[test]
    fn test_failed_join_leaves_no_trace() {
        let mut relay = Relay::new();
        let id = ConnectionId::new(1);
        relay.connect(id, crate::outbound_channel().0);
        relay.create_room("vault", Some("p".into())).unwrap();

        let result = relay.join_room(id, "vault", "eve", Some("wrong"));

        assert!(matches!(result, Err(RoomError::InvalidPassword { .. })));
        assert_eq!(relay.rooms().get_room("vault").unwrap().member_count(), 0);
        assert!(relay.connections().rooms_of(id).is_empty());
    }
}
