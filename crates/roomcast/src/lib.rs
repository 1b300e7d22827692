//! # Roomcast
//!
//! Real-time room-based messaging relay.
//!
//! Clients connect over WebSocket, create named rooms (optionally
//! password-protected), join and leave them, and broadcast text messages
//! to everyone in a room. The relay keeps all state in memory for the life
//! of the process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomcast::prelude::*;
//!
//! # async fn run() -> Result<(), RoomcastError> {
//! let config = ServerConfig::from_env()?;
//! let server = RoomcastServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod gateway;
mod handler;
mod server;

pub use config::{BIND_VAR, ConfigError, IDLE_TIMEOUT_VAR, ServerConfig};
pub use error::RoomcastError;
pub use gateway::{Gateway, HandlerFn};
pub use server::{RoomcastServer, RoomcastServerBuilder};

pub mod prelude {
    //! Everything needed to embed and run a relay.

    pub use crate::{
        ConfigError, Gateway, RoomcastError, RoomcastServer, RoomcastServerBuilder,
        ServerConfig,
    };
    pub use roomcast_protocol::{
        ChatMessage, Codec, JsonCodec, ProtocolError, Reply, Request, RoomEntry, RoomEvent,
        ServerFrame, event,
    };
    pub use roomcast_room::{Relay, RoomError, RoomSummary};
    pub use roomcast_transport::{ConnectionId, TransportError};
}
