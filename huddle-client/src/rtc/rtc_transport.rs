use crate::peer::PeerTransport;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::debug;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// [`PeerTransport`] over a `webrtc` peer connection.
pub struct RtcTransport {
    pub remote: ConnectionId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing peer connection to {}", self.remote);
        self.peer_connection.close().await?;
        Ok(())
    }
}
