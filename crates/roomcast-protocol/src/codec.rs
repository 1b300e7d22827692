//! Codec trait and the JSON implementation used on the wire.
//!
//! The handler only talks to [`Codec`]; which text format sits behind it
//! is a server construction detail.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts frames to wire text and raw inbound bytes back to frames.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes raw frame bytes into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use roomcast_protocol::{Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let req: Request = codec
///     .decode(br#"{"event":"getRooms","ack":1}"#)
///     .unwrap();
/// assert_eq!(req.event, "getRooms");
/// assert_eq!(req.ack, Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
