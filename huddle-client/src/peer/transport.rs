use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

/// Connectivity of the underlying media transport, as reported by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Things a transport reports on its own, outside any handshake call.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    LocalCandidate {
        remote: ConnectionId,
        candidate: IceCandidate,
    },
    RemoteTrack {
        remote: ConnectionId,
        stream_id: String,
        track_id: String,
    },
    StateChanged {
        remote: ConnectionId,
        state: TransportState,
    },
}

/// One direct media transport towards one remote participant.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Create an offer and install it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Create an answer and install it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        remote: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Box<dyn PeerTransport>>;
}
