use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, Participant, ServerEvent};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Outbound queues of every live WebSocket, keyed by connection id.
#[derive(Default)]
pub struct Connections {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(connection_id, tx);
    }

    pub fn remove(&self, connection_id: &ConnectionId) {
        self.peers.remove(connection_id);
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.peers.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Queue `event` for `connection_id`. Returns `false` if it is gone.
    pub fn send<P: Serialize>(&self, connection_id: &ConnectionId, event: &ServerEvent<P>) -> bool {
        let Some(peer) = self.peers.get(connection_id) else {
            return false;
        };

        match serde_json::to_string(event) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to queue WS message to {}: {:?}", connection_id, e);
                    return false;
                }
                true
            }
            Err(e) => {
                error!("Failed to serialize server event: {}", e);
                false
            }
        }
    }

    fn notify(&self, to: &ConnectionId, event: ServerEvent<Value>) {
        if !self.send(to, &event) {
            warn!("Attempted to notify disconnected connection {}", to);
        }
    }
}

#[async_trait]
impl SignalingOutput for Connections {
    async fn existing_users(&self, to: &ConnectionId, roster: &[Participant]) {
        self.notify(to, ServerEvent::ExistingUsers(roster.to_vec()));
    }

    async fn user_joined(&self, to: &ConnectionId, participant: &Participant) {
        self.notify(to, ServerEvent::UserJoined(participant.clone()));
    }

    async fn user_left(&self, to: &ConnectionId, departed: ConnectionId) {
        self.notify(
            to,
            ServerEvent::UserLeft {
                connection_id: departed,
            },
        );
    }
}
