//! Wire protocol for Roomcast.
//!
//! This crate defines what clients and the relay say to each other:
//!
//! - **Types** ([`Request`], [`ServerFrame`], [`Reply`], [`RoomEvent`] and
//!   the per-event payloads) — the frames that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how frames are converted
//!   to and from text.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! ```text
//! Transport (text frames) → Protocol (Request / ServerFrame) → Room core
//! ```
//!
//! Nothing here knows about connections or room membership.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChatMessage, CreateRoom, JoinRoom, LeaveRoom, Reply, Request, RoomEntry, RoomEvent,
    SendMessage, ServerFrame, event,
};
