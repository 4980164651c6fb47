use crate::error::ClientError;
use crate::media::RemoteMediaStream;
use crate::peer::{LinkEvent, LinkRole, LinkState, PeerConnector, PeerLink, TransportState};
use huddle_core::{
    ClientEvent, ConnectionId, HandshakeMessage, IceCandidate, IceServerConfig, Participant,
    SessionDescription,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Keeps one [`PeerLink`] per other participant in the room.
///
/// The coordinator is used purely as a message bus: everything sent goes out
/// as `signal` frames on `outbound`.
pub struct PeerManager {
    connector: Arc<dyn PeerConnector>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    link_events: mpsc::UnboundedSender<LinkEvent>,
    ice_servers: Vec<IceServerConfig>,
    links: HashMap<ConnectionId, PeerLink>,
    /// Peers that left. Kept for the whole call: their signals are stale.
    departed: HashSet<ConnectionId>,
    /// Peers whose link broke. Only a fresh offer from them opens a new link;
    /// also kept for the whole call.
    abandoned: HashSet<ConnectionId>,
    seen: Vec<Participant>,
}

impl PeerManager {
    pub fn new(
        connector: Arc<dyn PeerConnector>,
        outbound: mpsc::UnboundedSender<ClientEvent>,
        link_events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Self {
        Self {
            connector,
            outbound,
            link_events,
            ice_servers: Vec::new(),
            links: HashMap::new(),
            departed: HashSet::new(),
            abandoned: HashSet::new(),
            seen: Vec::new(),
        }
    }

    pub fn on_ice_config(&mut self, ice_servers: Vec<IceServerConfig>) {
        debug!("Using {} ICE server entries", ice_servers.len());
        self.ice_servers = ice_servers;
    }

    /// We just joined: offer to everyone already present.
    pub async fn on_roster(&mut self, roster: Vec<Participant>) {
        info!("Joined room with {} participant(s) present", roster.len());

        for participant in roster {
            let remote = participant.connection_id;
            self.observe(&participant);

            if self.departed.contains(&remote)
                || self.abandoned.contains(&remote)
                || self.links.contains_key(&remote)
            {
                continue;
            }
            if !self.open_link(remote, Some(participant), LinkRole::Initiator).await {
                continue;
            }
            if let Err(e) = self.send_offer(remote).await {
                self.abandon(remote, e).await;
            }
        }
    }

    /// Someone joined after us. They will offer; we only get ready.
    pub async fn on_participant_joined(&mut self, participant: Participant) {
        let remote = participant.connection_id;
        self.observe(&participant);
        info!("{} joined ({})", participant.display_name, remote);

        if let Some(link) = self.links.get_mut(&remote) {
            link.participant.get_or_insert(participant);
            return;
        }

        if self.open_link(remote, Some(participant), LinkRole::Responder).await {
            if let Some(link) = self.links.get_mut(&remote) {
                link.state = LinkState::AwaitingOffer;
            }
        }
    }

    pub async fn on_handshake(&mut self, from: ConnectionId, message: HandshakeMessage) {
        if self.departed.contains(&from) {
            debug!("Ignoring stale {} from departed {}", message.kind(), from);
            return;
        }
        if self.abandoned.contains(&from) {
            if !matches!(message, HandshakeMessage::Offer { .. }) {
                debug!("Ignoring {} from abandoned {}", message.kind(), from);
                return;
            }
            info!("{} renegotiates after a failed handshake", from);
            self.abandoned.remove(&from);
        }

        let outcome = match message {
            HandshakeMessage::Offer { sdp } => self.accept_offer(from, sdp).await,
            HandshakeMessage::Answer { sdp } => self.accept_answer(from, sdp).await,
            HandshakeMessage::Candidate { candidate } => {
                self.accept_candidate(from, candidate).await
            }
        };

        if let Err(e) = outcome {
            self.abandon(from, e).await;
        }
    }

    /// Close and forget the link to `remote`. Later signals from it are ignored.
    pub async fn on_participant_left(&mut self, remote: ConnectionId) {
        self.departed.insert(remote);
        self.abandoned.remove(&remote);

        match self.links.remove(&remote) {
            Some(link) => {
                info!(
                    "{} left, closing link in state {:?}",
                    link.display_name().unwrap_or("Participant"),
                    link.state
                );
                link.close().await;
            }
            None => debug!("{} left without a link", remote),
        }
    }

    pub async fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::LocalCandidate { remote, candidate } => {
                if self.links.contains_key(&remote) {
                    self.send_signal(remote, HandshakeMessage::Candidate { candidate });
                }
            }
            LinkEvent::RemoteTrack {
                remote,
                stream_id,
                track_id,
            } => {
                let Some(link) = self.links.get_mut(&remote) else {
                    return;
                };
                match &mut link.remote_stream {
                    Some(stream) => stream.add_track(track_id),
                    None => {
                        let display_name = link
                            .display_name()
                            .unwrap_or("Participant")
                            .to_owned();
                        info!("Receiving media from {}", display_name);
                        link.remote_stream = Some(RemoteMediaStream::new(
                            remote,
                            display_name,
                            stream_id,
                            track_id,
                        ));
                    }
                }
            }
            LinkEvent::StateChanged { remote, state } => {
                let Some(link) = self.links.get_mut(&remote) else {
                    return;
                };
                debug!("Transport to {} is {:?}", remote, state);
                link.transport_state = state;

                if state == TransportState::Failed {
                    self.abandon(remote, "transport failed").await;
                }
            }
        }
    }

    /// Close every link. Returns how many were open.
    pub async fn teardown(&mut self) -> usize {
        let count = self.links.len();
        for (remote, link) in self.links.drain() {
            self.departed.insert(remote);
            link.close().await;
        }
        if count > 0 {
            info!("Closed {} peer link(s)", count);
        }
        count
    }

    pub fn link(&self, remote: &ConnectionId) -> Option<&PeerLink> {
        self.links.get(remote)
    }

    pub fn link_state(&self, remote: &ConnectionId) -> Option<LinkState> {
        self.links.get(remote).map(|l| l.state)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links whose handshake completed.
    pub fn connected_count(&self) -> usize {
        self.links
            .values()
            .filter(|l| l.state == LinkState::Connected)
            .count()
    }

    /// Links with live remote media. This, not the roster size, is what the
    /// user actually sees.
    pub fn streaming_count(&self) -> usize {
        self.links.values().filter(|l| l.is_streaming()).count()
    }

    /// Everyone observed during the call, in order of first appearance.
    pub fn participants_seen(&self) -> &[Participant] {
        &self.seen
    }

    fn observe(&mut self, participant: &Participant) {
        if !self
            .seen
            .iter()
            .any(|p| p.participant_id == participant.participant_id)
        {
            self.seen.push(participant.clone());
        }
    }

    async fn open_link(
        &mut self,
        remote: ConnectionId,
        participant: Option<Participant>,
        role: LinkRole,
    ) -> bool {
        let transport = match self
            .connector
            .connect(remote, &self.ice_servers, self.link_events.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Could not create transport to {}: {:#}", remote, e);
                return false;
            }
        };

        debug!("New {:?} link to {}", role, remote);
        self.links
            .insert(remote, PeerLink::new(remote, participant, role, transport));
        true
    }

    async fn send_offer(&mut self, remote: ConnectionId) -> Result<(), ClientError> {
        let Some(link) = self.links.get_mut(&remote) else {
            return Ok(());
        };

        link.state = LinkState::Offering;
        let offer = link
            .transport
            .create_offer()
            .await
            .map_err(|e| failed(remote, e))?;
        link.state = LinkState::AwaitingAnswer;

        self.send_signal(remote, offer.into());
        Ok(())
    }

    async fn accept_offer(&mut self, from: ConnectionId, sdp: String) -> Result<(), ClientError> {
        if !self.links.contains_key(&from) {
            let participant = self
                .seen
                .iter()
                .find(|p| p.connection_id == from)
                .cloned();
            if !self.open_link(from, participant, LinkRole::Responder).await {
                return Ok(());
            }
        }
        let Some(link) = self.links.get_mut(&from) else {
            return Ok(());
        };

        if !matches!(link.state, LinkState::New | LinkState::AwaitingOffer) {
            warn!("Unexpected offer from {} in state {:?}", from, link.state);
            return Ok(());
        }

        link.state = LinkState::Answering;
        link.transport
            .set_remote_description(SessionDescription::offer(sdp))
            .await
            .map_err(|e| failed(from, e))?;
        link.remote_description_set = true;

        let answer = link
            .transport
            .create_answer()
            .await
            .map_err(|e| failed(from, e))?;
        self.send_signal(from, answer.into());

        let Some(link) = self.links.get_mut(&from) else {
            return Ok(());
        };
        link.drain_candidates().await.map_err(|e| failed(from, e))?;
        link.state = LinkState::Connected;
        Ok(())
    }

    async fn accept_answer(&mut self, from: ConnectionId, sdp: String) -> Result<(), ClientError> {
        let Some(link) = self.links.get_mut(&from) else {
            warn!("Answer from {} without a link", from);
            return Ok(());
        };

        if link.state != LinkState::AwaitingAnswer {
            warn!("Unexpected answer from {} in state {:?}", from, link.state);
            return Ok(());
        }

        link.transport
            .set_remote_description(SessionDescription::answer(sdp))
            .await
            .map_err(|e| failed(from, e))?;
        link.remote_description_set = true;
        link.state = LinkState::Connected;
        link.drain_candidates().await.map_err(|e| failed(from, e))?;
        Ok(())
    }

    async fn accept_candidate(
        &mut self,
        from: ConnectionId,
        candidate: IceCandidate,
    ) -> Result<(), ClientError> {
        if !self.links.contains_key(&from)
            && !self.open_link(from, None, LinkRole::Responder).await
        {
            return Ok(());
        }
        let Some(link) = self.links.get_mut(&from) else {
            return Ok(());
        };

        if link.remote_description_set {
            link.transport
                .add_ice_candidate(candidate)
                .await
                .map_err(|e| failed(from, e))?;
        } else {
            link.pending_candidates.push_back(candidate);
            debug!(
                "Queued candidate from {} ({} pending)",
                from,
                link.pending_candidates.len()
            );
        }
        Ok(())
    }

    /// Drop a single broken link. The rest of the mesh is untouched.
    async fn abandon(&mut self, remote: ConnectionId, reason: impl fmt::Display) {
        warn!("Abandoning link to {}: {}", remote, reason);

        self.abandoned.insert(remote);
        if let Some(link) = self.links.remove(&remote) {
            link.close().await;
        }
    }

    fn send_signal(&self, to: ConnectionId, data: HandshakeMessage) {
        let kind = data.kind();
        if self.outbound.send(ClientEvent::Signal { to, data }).is_err() {
            debug!("Signaling closed, {} to {} not sent", kind, to);
        }
    }
}

fn failed(remote: ConnectionId, error: anyhow::Error) -> ClientError {
    ClientError::HandshakeApplyFailed {
        remote,
        reason: format!("{:#}", error),
    }
}
