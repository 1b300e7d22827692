//! Error types for the room layer.

/// Errors that can occur during room operations.
///
/// The `Display` text of each variant is exactly what the requesting client
/// sees in its `{error}` reply, so the room name is carried as data rather
/// than formatted into the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// `createRoom` named a room that already exists.
    #[error("Room already exists")]
    AlreadyExists { room: String },

    /// The named room does not exist.
    #[error("Room does not exist")]
    NotFound { room: String },

    /// The room is password-protected and the supplied password differs.
    #[error("Invalid password")]
    InvalidPassword { room: String },
}

impl RoomError {
    /// The room the failed operation was aimed at.
    pub fn room(&self) -> &str {
        match self {
            Self::AlreadyExists { room }
            | Self::NotFound { room }
            | Self::InvalidPassword { room } => room,
        }
    }
}
