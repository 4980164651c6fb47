use crate::media::RemoteMediaStream;
use crate::peer::{PeerTransport, TransportState};
use huddle_core::{ConnectionId, IceCandidate, Participant};
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Already in the room when the remote joined; sends the offer.
    Initiator,
    /// The newcomer side; waits for the offer.
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Offering,
    AwaitingAnswer,
    AwaitingOffer,
    Answering,
    Connected,
    Closed,
}

pub struct PeerLink {
    pub(crate) remote: ConnectionId,
    /// Unknown when the first thing heard from the peer was a signal.
    pub(crate) participant: Option<Participant>,
    pub(crate) role: LinkRole,
    pub(crate) state: LinkState,
    pub(crate) transport: Box<dyn PeerTransport>,
    pub(crate) pending_candidates: VecDeque<IceCandidate>,
    pub(crate) remote_description_set: bool,
    pub(crate) remote_stream: Option<RemoteMediaStream>,
    pub(crate) transport_state: TransportState,
}

impl PeerLink {
    pub(crate) fn new(
        remote: ConnectionId,
        participant: Option<Participant>,
        role: LinkRole,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        Self {
            remote,
            participant,
            role,
            state: LinkState::New,
            transport,
            pending_candidates: VecDeque::new(),
            remote_description_set: false,
            remote_stream: None,
            transport_state: TransportState::New,
        }
    }

    pub fn remote(&self) -> ConnectionId {
        self.remote
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn display_name(&self) -> Option<&str> {
        self.participant.as_ref().map(|p| p.display_name.as_str())
    }

    pub fn remote_stream(&self) -> Option<&RemoteMediaStream> {
        self.remote_stream.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.remote_stream.is_some() && self.transport_state == TransportState::Connected
    }

    /// Apply every queued candidate in arrival order. Stops at the first failure.
    pub(crate) async fn drain_candidates(&mut self) -> anyhow::Result<()> {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.transport.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    pub(crate) async fn close(mut self) {
        self.state = LinkState::Closed;
        self.remote_stream = None;
        if let Err(e) = self.transport.close().await {
            warn!("Closing transport to {} failed: {:#}", self.remote, e);
        }
    }
}
