use crate::directory::{DirectoryError, RoomDirectory};
use async_trait::async_trait;
use dashmap::DashMap;
use huddle_core::{ParticipantId, RoomId};
use std::collections::HashSet;
use tracing::info;

/// Directory kept in process memory.
///
/// A closed directory only knows rooms passed to [`register`](Self::register);
/// an open one treats every well-formed reference as scheduled.
#[derive(Default)]
pub struct InMemoryRoomDirectory {
    rooms: DashMap<RoomId, HashSet<ParticipantId>>,
    open: bool,
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open() -> Self {
        Self {
            rooms: DashMap::new(),
            open: true,
        }
    }

    pub fn register(&self, room_id: RoomId) {
        self.rooms.entry(room_id).or_default();
    }

    pub fn attendees(&self, room_id: &RoomId) -> Vec<ParticipantId> {
        self.rooms
            .get(room_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, DirectoryError> {
        Ok(self.open || self.rooms.contains_key(room_id))
    }

    async fn record_attendance(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(), DirectoryError> {
        let added = self
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(participant_id.clone());

        if added {
            info!("Recorded attendance of {} in {}", participant_id, room_id);
        }
        Ok(())
    }
}
