//! Frames and payloads that travel between clients and the relay.
//!
//! Inbound, a client sends a [`Request`]: an event name, a JSON payload,
//! and an optional acknowledgement id. Outbound, the relay sends
//! [`ServerFrame`]s: either a [`Reply`] to one request or a [`RoomEvent`]
//! broadcast to a room.
//!
//! ```text
//! client → {"event":"joinRoom","data":{"roomName":"lobby","username":"bob"},"ack":4}
//! room   ← {"event":"roomJoined","data":"User bob (conn-2) joined room lobby"}
//! client ← {"ack":4,"data":{"room":"lobby","message":"Joined room: lobby"}}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// Event names used on the wire.
pub mod event {
    /// Client → relay: create a room.
    pub const CREATE_ROOM: &str = "createRoom";
    /// Client → relay: join a room.
    pub const JOIN_ROOM: &str = "joinRoom";
    /// Client → relay: leave a room.
    pub const LEAVE_ROOM: &str = "leaveRoom";
    /// Client → relay: broadcast a chat message to a room.
    pub const SEND_MESSAGE: &str = "sendMessage";
    /// Client → relay: list rooms.
    pub const GET_ROOMS: &str = "getRooms";

    /// Relay → room: someone joined.
    pub const ROOM_JOINED: &str = "roomJoined";
    /// Relay → room: someone left.
    pub const ROOM_LEFT: &str = "roomLeft";
    /// Relay → room: a chat message.
    pub const MESSAGE: &str = "message";
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One inbound frame from a client.
///
/// `data` is kept as raw JSON until the gateway knows which event it is;
/// each handler then decodes its own payload type with
/// [`Request::payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The event name, e.g. `"joinRoom"`.
    pub event: String,

    /// The event payload. Absent means `null`.
    #[serde(default)]
    pub data: Value,

    /// Client-chosen id echoed back on the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl Request {
    /// Builds a request with the given event and payload.
    pub fn new(event: impl Into<String>, data: impl Serialize, ack: Option<u64>) -> Self {
        Self {
            event: event.into(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
            ack,
        }
    }

    /// Decodes `data` as the payload of `event`.
    pub fn payload<T: DeserializeOwned>(&self, event: &'static str) -> Result<T, ProtocolError> {
        T::deserialize(&self.data)
            .map_err(|source| ProtocolError::InvalidPayload { event, source })
    }
}

/// Payload of `createRoom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Payload of `joinRoom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Payload of `leaveRoom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoom {
    pub room_name: String,
    pub username: String,
}

/// Payload of `sendMessage`. Note the room field is `room`, not `roomName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub room: String,
    pub message: String,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// One row of a `getRooms` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntry {
    pub room_name: String,
    pub has_password: bool,
}

/// The reply sent back to the client that made a request.
///
/// Untagged: each variant is distinguished by its field names. Variant
/// order matters for decoding, since `{room, message}` would also match
/// the one-field `{message}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// `{room, message}`: result of a join or leave.
    Membership { room: String, message: String },
    /// `{rooms: [...]}`: result of `getRooms`.
    Rooms { rooms: Vec<RoomEntry> },
    /// `{error}`: any request-scoped failure.
    Error { error: String },
    /// `{message}`: result of `createRoom`.
    Message { message: String },
}

impl Reply {
    /// Builds the `{message}` reply.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Builds the `{room, message}` reply for a join or leave.
    pub fn membership(room: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Membership {
            room: room.into(),
            message: message.into(),
        }
    }

    /// Builds the `{error}` reply from any displayable failure.
    pub fn error(error: impl ToString) -> Self {
        Self::Error {
            error: error.to_string(),
        }
    }

    /// Builds the `{rooms}` reply for `getRooms`.
    pub fn rooms(rooms: Vec<RoomEntry>) -> Self {
        Self::Rooms { rooms }
    }

    /// Returns `true` for the `{error}` shape.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Body of a `message` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
}

/// An event broadcast to every member of a room.
///
/// Adjacently tagged: `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum RoomEvent {
    /// Human-readable join notice.
    #[serde(rename = "roomJoined")]
    RoomJoined(String),
    /// Human-readable leave notice.
    #[serde(rename = "roomLeft")]
    RoomLeft(String),
    /// A chat message.
    #[serde(rename = "message")]
    Message(ChatMessage),
}

impl RoomEvent {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomJoined(_) => event::ROOM_JOINED,
            Self::RoomLeft(_) => event::ROOM_LEFT,
            Self::Message(_) => event::MESSAGE,
        }
    }
}

/// Any frame the relay writes to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// A room broadcast. Listed first so decoding tries the tagged shape
    /// before the looser reply shape.
    Event(RoomEvent),
    /// The answer to one request, correlated by `ack`.
    Reply { ack: Option<u64>, data: Reply },
}

impl ServerFrame {
    /// Wraps a reply with the ack of the request it answers.
    pub fn reply(ack: Option<u64>, data: Reply) -> Self {
        Self::Reply { ack, data }
    }
}

impl From<RoomEvent> for ServerFrame {
    fn from(event: RoomEvent) -> Self {
        Self::Event(event)
    }
}
