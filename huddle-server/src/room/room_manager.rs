use crate::room::{Room, RoomHandle};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::RoomId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::info;

const ROOM_INBOX: usize = 100;

/// Room registry: room id to the actor currently serving it.
///
/// Rooms appear on first use and remove themselves once empty.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    capacity: usize,
    signaling: Arc<dyn SignalingOutput>,
    next_epoch: Arc<AtomicU64>,
}

impl RoomManager {
    pub fn new(capacity: usize, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            capacity,
            signaling,
            next_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_room_handle(&self, room_id: &RoomId) -> RoomHandle {
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| self.spawn_room(room_id))
            .clone()
    }

    /// Drop `handle` from the registry unless a newer actor replaced it.
    pub fn forget(&self, handle: &RoomHandle) {
        self.rooms
            .remove_if(handle.room_id(), |_, current| current.epoch() == handle.epoch());
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub async fn occupancy(&self, room_id: &RoomId) -> usize {
        let handle = self.rooms.get(room_id).map(|h| h.clone());
        match handle {
            Some(handle) => handle.members().await.len(),
            None => 0,
        }
    }

    fn spawn_room(&self, room_id: &RoomId) -> RoomHandle {
        info!("Creating new room: {}", room_id);

        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(ROOM_INBOX);
        let room = Room::new(room_id.clone(), self.capacity, rx, self.signaling.clone())
            .registered_in(self.rooms.clone(), epoch);
        tokio::spawn(room.run());

        RoomHandle::new(room_id.clone(), epoch, tx)
    }
}
