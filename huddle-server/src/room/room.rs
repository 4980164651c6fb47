use crate::room::room_command::{Admission, RoomCommand};
use crate::room::room_handle::RoomHandle;
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::{ConnectionId, Participant, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

struct Registration {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    epoch: u64,
}

/// Actor owning the membership of a single room.
///
/// Every mutation goes through its inbox, so the capacity check and the
/// insert that follows it can never interleave with another join.
pub struct Room {
    room_id: RoomId,
    capacity: usize,
    members: Vec<Participant>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
    registration: Option<Registration>,
}

impl Room {
    pub fn new(
        room_id: RoomId,
        capacity: usize,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            room_id,
            capacity,
            members: Vec::new(),
            command_rx,
            signaling,
            registration: None,
        }
    }

    /// Lets the actor drop its own manager entry once it empties out.
    pub(crate) fn registered_in(
        mut self,
        rooms: Arc<DashMap<RoomId, RoomHandle>>,
        epoch: u64,
    ) -> Self {
        self.registration = Some(Registration { rooms, epoch });
        self
    }

    pub async fn run(mut self) {
        info!("Room {} event loop started", self.room_id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;

            if self.members.is_empty() && self.unregister() {
                break;
            }
        }

        // Whatever is still queued was addressed to a room that no longer
        // exists; joins get `Closed` and are retried on a fresh actor.
        self.command_rx.close();
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RoomCommand::Join { reply, .. } => {
                    let _ = reply.send(Admission::Closed);
                }
                RoomCommand::Members { reply } => {
                    let _ = reply.send(Vec::new());
                }
                RoomCommand::Leave { .. } => {}
            }
        }

        info!("Room {} event loop finished", self.room_id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { participant, reply } => {
                let admission = self.admit(participant).await;
                let _ = reply.send(admission);
            }

            RoomCommand::Leave { connection_id } => {
                self.remove_with_notify(connection_id).await;
            }

            RoomCommand::Members { reply } => {
                let _ = reply.send(self.members.clone());
            }
        }
    }

    async fn admit(&mut self, participant: Participant) -> Admission {
        if self.members.len() >= self.capacity {
            info!(
                "Room {} full, turning away {}",
                self.room_id, participant.connection_id
            );
            return Admission::Full;
        }

        let roster = self.members.clone();
        self.members.push(participant.clone());

        // Existing members hear about the newcomer before the newcomer can
        // learn who they are and start offering.
        for member in &roster {
            self.signaling
                .user_joined(&member.connection_id, &participant)
                .await;
        }
        self.signaling
            .existing_users(&participant.connection_id, &roster)
            .await;

        info!(
            "User {} ({}) joined {} ({}/{})",
            participant.display_name,
            participant.connection_id,
            self.room_id,
            self.members.len(),
            self.capacity
        );

        Admission::Admitted(roster)
    }

    async fn remove_with_notify(&mut self, connection_id: ConnectionId) {
        let snapshot = self.members.clone();
        let before = self.members.len();
        self.members.retain(|m| m.connection_id != connection_id);

        if self.members.len() == before {
            debug!(
                "Leave for {} ignored, not a member of {}",
                connection_id, self.room_id
            );
            return;
        }

        for member in snapshot
            .iter()
            .filter(|m| m.connection_id != connection_id)
        {
            self.signaling
                .user_left(&member.connection_id, connection_id)
                .await;
        }

        info!("User {} left {}", connection_id, self.room_id);
    }

    fn unregister(&mut self) -> bool {
        let Some(registration) = self.registration.take() else {
            return false;
        };

        registration
            .rooms
            .remove_if(&self.room_id, |_, handle| handle.epoch() == registration.epoch);
        true
    }
}
