use async_trait::async_trait;
use huddle_core::{JoinRejection, ParticipantIdentity};

/// Resolves a bearer credential presented in `join-room` to a participant.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<ParticipantIdentity, JoinRejection>;
}
