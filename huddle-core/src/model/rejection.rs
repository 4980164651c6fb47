use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal reasons a `join-room` attempt is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum JoinRejection {
    #[error("Authentication required")]
    AuthRequired,
    #[error("Invalid token")]
    InvalidCredential,
    #[error("Invalid session ID")]
    InvalidRoom,
    #[error("Session not found")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Connection already joined a room")]
    AlreadyJoined,
    #[error("Room service unavailable")]
    Unavailable,
}
