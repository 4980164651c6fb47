use async_trait::async_trait;
use huddle_core::{ConnectionId, Participant};

/// Outbound side of the signaling channel, as seen by room actors.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Roster of members present before `to` was admitted.
    async fn existing_users(&self, to: &ConnectionId, roster: &[Participant]);

    async fn user_joined(&self, to: &ConnectionId, participant: &Participant);

    async fn user_left(&self, to: &ConnectionId, departed: ConnectionId);
}
