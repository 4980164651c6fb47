use huddle_core::{ConnectionId, JoinRejection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Camera or microphone could not be opened. No handshake is attempted.
    #[error("Could not acquire local media: {0}")]
    MediaAcquisitionFailed(String),

    /// The coordinator refused the join. Terminal for this attempt.
    #[error("Join rejected: {0}")]
    Rejected(JoinRejection),

    /// Applying a handshake step to one link failed; only that link is dropped.
    #[error("Handshake with {remote} failed: {reason}")]
    HandshakeApplyFailed { remote: ConnectionId, reason: String },

    #[error("Signaling failure: {0}")]
    Signaling(String),
}
