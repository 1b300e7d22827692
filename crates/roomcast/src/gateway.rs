//! Gateway: the dispatch table from inbound event names to handlers.
//!
//! Each handler takes the relay, the calling connection, and the request,
//! and returns the reply for the caller (if any). Broadcasts are a side
//! effect of the [`Relay`] call the handler makes. Room errors become
//! `{error}` replies here; they never reach the connection loop as errors.

use std::collections::HashMap;

use roomcast_protocol::{
    CreateRoom, JoinRoom, LeaveRoom, ProtocolError, Reply, Request, RoomEntry, SendMessage,
    event,
};
use roomcast_room::Relay;
use roomcast_transport::ConnectionId;

/// Signature shared by every event handler.
pub type HandlerFn =
    fn(&mut Relay, ConnectionId, &Request) -> Result<Option<Reply>, ProtocolError>;

/// Maps event names to handlers.
pub struct Gateway {
    routes: HashMap<&'static str, HandlerFn>,
}

impl Gateway {
    /// Creates a gateway with the five relay events registered.
    pub fn new() -> Self {
        let routes: [(&'static str, HandlerFn); 5] = [
            (event::CREATE_ROOM, create_room),
            (event::JOIN_ROOM, join_room),
            (event::LEAVE_ROOM, leave_room),
            (event::SEND_MESSAGE, send_message),
            (event::GET_ROOMS, get_rooms),
        ];
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    /// Whether an event name has a handler.
    pub fn handles(&self, event: &str) -> bool {
        self.routes.contains_key(event)
    }

    /// Runs the handler for `request.event`.
    ///
    /// A payload that does not match the event's shape is answered with an
    /// `Invalid payload` error reply.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownEvent`] if no handler is registered.
    pub fn dispatch(
        &self,
        relay: &mut Relay,
        conn_id: ConnectionId,
        request: &Request,
    ) -> Result<Option<Reply>, ProtocolError> {
        let handler = self
            .routes
            .get(request.event.as_str())
            .ok_or_else(|| ProtocolError::UnknownEvent(request.event.clone()))?;

        match handler(relay, conn_id, request) {
            Err(ProtocolError::InvalidPayload { event: name, source }) => {
                tracing::debug!(%conn_id, event = name, error = %source, "invalid payload");
                Ok(Some(Reply::error(format!("Invalid payload: {source}"))))
            }
            other => other,
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn create_room(
    relay: &mut Relay,
    _conn_id: ConnectionId,
    request: &Request,
) -> Result<Option<Reply>, ProtocolError> {
    let CreateRoom {
        room_name,
        password,
    } = request.payload(event::CREATE_ROOM)?;

    let reply = match relay.create_room(&room_name, password) {
        Ok(()) => Reply::message(format!("Room {room_name} created")),
        Err(e) => Reply::error(e),
    };
    Ok(Some(reply))
}

fn join_room(
    relay: &mut Relay,
    conn_id: ConnectionId,
    request: &Request,
) -> Result<Option<Reply>, ProtocolError> {
    let JoinRoom {
        room_name,
        username,
        password,
    } = request.payload(event::JOIN_ROOM)?;

    let reply = match relay.join_room(conn_id, &room_name, &username, password.as_deref()) {
        Ok(()) => {
            let message = format!("Joined room: {room_name}");
            Reply::membership(room_name, message)
        }
        Err(e) => Reply::error(e),
    };
    Ok(Some(reply))
}

fn leave_room(
    relay: &mut Relay,
    conn_id: ConnectionId,
    request: &Request,
) -> Result<Option<Reply>, ProtocolError> {
    let LeaveRoom {
        room_name,
        username,
    } = request.payload(event::LEAVE_ROOM)?;

    let reply = match relay.leave_room(conn_id, &room_name, &username) {
        Ok(()) => {
            let message = format!("Left room: {room_name}");
            Reply::membership(room_name, message)
        }
        Err(e) => Reply::error(e),
    };
    Ok(Some(reply))
}

/// No reply on success.
fn send_message(
    relay: &mut Relay,
    _conn_id: ConnectionId,
    request: &Request,
) -> Result<Option<Reply>, ProtocolError> {
    let SendMessage {
        room,
        message,
        username,
    } = request.payload(event::SEND_MESSAGE)?;

    match relay.send_message(&room, &username, &message) {
        Ok(_) => Ok(None),
        Err(e) => Ok(Some(Reply::error(e))),
    }
}

/// Ignores `data`.
fn get_rooms(
    relay: &mut Relay,
    _conn_id: ConnectionId,
    _request: &Request,
) -> Result<Option<Reply>, ProtocolError> {
    let rooms = relay
        .list_rooms()
        .into_iter()
        .map(|summary| RoomEntry {
            room_name: summary.name,
            has_password: summary.has_password,
        })
        .collect();
    Ok(Some(Reply::rooms(rooms)))
}
