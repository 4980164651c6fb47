use async_trait::async_trait;
use huddle_core::{ParticipantId, RoomId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("room directory unavailable: {0}")]
    Unavailable(String),
}

/// Persistent side of rooms: which sessions exist and who attended them.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, DirectoryError>;

    /// Must be idempotent per `(room, participant)`.
    async fn record_attendance(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(), DirectoryError>;
}
