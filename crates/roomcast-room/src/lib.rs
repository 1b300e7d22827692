//! Room registry and broadcast core for Roomcast.
//!
//! Everything that must stay consistent while many clients create, join,
//! leave, and message rooms at once lives here.
//!
//! # Key types
//!
//! - [`RoomStore`] — owns every [`Room`]; the only place membership changes
//! - [`ConnectionRegistry`] — live connections, their outbound queues, and
//!   which rooms each has joined
//! - [`BroadcastDispatcher`] — fans a [`RoomEvent`] out to a room's members
//! - [`Relay`] — owns a store and a registry and implements join, leave,
//!   message, and disconnect cleanup on top of them
//! - [`RoomError`] — the request-scoped failures
//!
//! [`RoomEvent`]: roomcast_protocol::RoomEvent

mod dispatch;
mod error;
mod registry;
mod relay;
mod room;
mod store;

pub use dispatch::BroadcastDispatcher;
pub use error::RoomError;
pub use registry::{ConnectionReceiver, ConnectionRegistry, ConnectionSender, outbound_channel};
pub use relay::{DISCONNECTED_USERNAME, Relay, joined_notice, left_notice};
pub use room::{Room, RoomSummary};
pub use store::RoomStore;
