/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        /// The address we tried to bind.
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a TCP connection or completing the WebSocket upgrade failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Writing a frame to the peer failed.
    #[error("send failed on {id}: {reason}")]
    SendFailed {
        /// The connection the frame was meant for.
        id: crate::ConnectionId,
        /// Transport-level description of the failure.
        reason: String,
    },

    /// Reading the next frame from the peer failed.
    #[error("receive failed on {id}: {reason}")]
    ReceiveFailed {
        /// The connection we were reading from.
        id: crate::ConnectionId,
        /// Transport-level description of the failure.
        reason: String,
    },

    /// The local address of the listener could not be read.
    #[error("local address unavailable: {0}")]
    LocalAddr(#[source] std::io::Error),
}
