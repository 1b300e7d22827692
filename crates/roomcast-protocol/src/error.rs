//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a frame into text).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes are not a well-formed request frame.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame is well-formed but the `data` of a known event does not
    /// match that event's payload shape.
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        /// The event whose payload was rejected.
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No handler is registered for this event name.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}
