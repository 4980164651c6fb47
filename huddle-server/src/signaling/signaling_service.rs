use crate::auth::IdentityVerifier;
use crate::config::ServerConfig;
use crate::directory::RoomDirectory;
use crate::room::{Admission, RoomHandle, RoomManager};
use crate::signaling::Connections;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{
    ClientEvent, ConnectionId, IceServerConfig, JoinRejection, Participant, RoomId, ServerEvent,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Attempts to reach a live actor for a room that keeps closing under us.
const JOIN_ATTEMPTS: usize = 3;

struct SignalingInner {
    connections: Arc<Connections>,
    rooms: RoomManager,
    /// Room each connection was admitted to, or is being admitted to.
    memberships: DashMap<ConnectionId, RoomHandle>,
    verifier: Arc<dyn IdentityVerifier>,
    directory: Arc<dyn RoomDirectory>,
    ice_servers: Vec<IceServerConfig>,
    dev_room: Option<RoomId>,
}

/// The room coordinator: admission, relay and departure of connections.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(
        config: &ServerConfig,
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn RoomDirectory>,
    ) -> Self {
        let connections = Arc::new(Connections::new());
        let rooms = RoomManager::new(config.capacity(), connections.clone());

        if let Some(room) = &config.dev_room {
            warn!(
                "Development room '{}' is enabled: it skips room validation and attendance",
                room
            );
        }

        Self {
            inner: Arc::new(SignalingInner {
                connections,
                rooms,
                memberships: DashMap::new(),
                verifier,
                directory,
                ice_servers: config.ice_servers.clone(),
                dev_room: config.dev_room.clone(),
            }),
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.inner.rooms
    }

    pub fn connections(&self) -> &Connections {
        &self.inner.connections
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    /// Register a freshly opened socket and hand it the ICE configuration.
    pub fn connect(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.add(connection_id, tx);
        self.inner.connections.send(
            &connection_id,
            &ServerEvent::<Value>::IceConfig {
                ice_servers: self.get_ice_servers(),
            },
        );
    }

    pub async fn handle_event(&self, connection_id: ConnectionId, event: ClientEvent<Value>) {
        match event {
            ClientEvent::JoinRoom { room_id, token } => {
                if let Err(reason) = self.join(connection_id, room_id, token).await {
                    self.inner
                        .connections
                        .send(&connection_id, &ServerEvent::<Value>::rejected(reason));
                }
            }
            ClientEvent::Signal { to, data } => self.relay(connection_id, to, data),
        }
    }

    /// Admit `connection_id` into `room_id`.
    ///
    /// On success the room actor has already delivered `existing-users` to the
    /// joiner and `user-joined` to everyone else.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        credential: Option<String>,
    ) -> Result<RoomHandle, JoinRejection> {
        if self.inner.memberships.contains_key(&connection_id) {
            return Err(JoinRejection::AlreadyJoined);
        }

        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .ok_or(JoinRejection::AuthRequired)?;
        let identity = self.inner.verifier.verify(&credential).await?;

        if self.inner.dev_room.as_ref() != Some(&room_id) {
            if !room_id.is_well_formed() {
                return Err(JoinRejection::InvalidRoom);
            }

            match self.inner.directory.room_exists(&room_id).await {
                Ok(true) => {}
                Ok(false) => return Err(JoinRejection::RoomNotFound),
                Err(e) => {
                    warn!("Room lookup for {} failed: {}", room_id, e);
                    return Err(JoinRejection::Unavailable);
                }
            }

            if let Err(e) = self
                .inner
                .directory
                .record_attendance(&room_id, &identity.participant_id)
                .await
            {
                warn!(
                    "Attendance of {} in {} not recorded: {}",
                    identity.participant_id, room_id, e
                );
            }
        }

        self.admit(Participant::new(connection_id, identity), &room_id)
            .await
    }

    async fn admit(
        &self,
        participant: Participant,
        room_id: &RoomId,
    ) -> Result<RoomHandle, JoinRejection> {
        let connection_id = participant.connection_id;

        for _ in 0..JOIN_ATTEMPTS {
            let handle = self.inner.rooms.get_room_handle(room_id);
            // Recorded before the request leaves so a disconnect racing the
            // join still sends the matching `Leave`.
            self.inner.memberships.insert(connection_id, handle.clone());

            match handle.join(participant.clone()).await {
                Admission::Admitted(_) => return Ok(handle),
                Admission::Full => {
                    self.inner.memberships.remove(&connection_id);
                    return Err(JoinRejection::RoomFull);
                }
                Admission::Closed => {
                    debug!("Room {} closed during join, retrying", room_id);
                    self.inner.rooms.forget(&handle);
                }
            }
        }

        self.inner.memberships.remove(&connection_id);
        Err(JoinRejection::Unavailable)
    }

    /// Forward `payload` to `to` unchanged. A missing target is not an error:
    /// it usually left while the handshake was in flight.
    pub fn relay(&self, from: ConnectionId, to: ConnectionId, payload: Value) {
        let delivered = self
            .inner
            .connections
            .send(&to, &ServerEvent::Signal { from, data: payload });

        if delivered {
            debug!("Signal forwarded from {} to {}", from, to);
        } else {
            debug!("Signal from {} dropped, {} is gone", from, to);
        }
    }

    /// Tear down everything tied to a closed socket. Safe to call once per
    /// connection at any point, including mid-join.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);

        if let Some((_, handle)) = self.inner.memberships.remove(connection_id) {
            info!(
                "Connection {} leaving room {}",
                connection_id,
                handle.room_id()
            );
            handle.leave(*connection_id).await;
        }
    }
}
