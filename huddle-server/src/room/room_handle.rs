use crate::room::{Admission, RoomCommand};
use huddle_core::{ConnectionId, Participant, RoomId};
use tokio::sync::{mpsc, oneshot};

/// Address of one running room actor.
///
/// `epoch` tells apart successive actors serving the same room id.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    epoch: u64,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(room_id: RoomId, epoch: u64, tx: mpsc::Sender<RoomCommand>) -> Self {
        Self { room_id, epoch, tx }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub async fn join(&self, participant: Participant) -> Admission {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(RoomCommand::Join { participant, reply })
            .await
            .is_err()
        {
            return Admission::Closed;
        }
        rx.await.unwrap_or(Admission::Closed)
    }

    pub async fn leave(&self, connection_id: ConnectionId) {
        let _ = self.tx.send(RoomCommand::Leave { connection_id }).await;
    }

    pub async fn members(&self) -> Vec<Participant> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(RoomCommand::Members { reply }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}
