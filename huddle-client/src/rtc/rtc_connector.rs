use crate::media::LocalMedia;
use crate::peer::{LinkEvent, PeerConnector, PeerTransport, TransportState};
use crate::rtc::RtcTransport;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

/// Opens `webrtc` peer connections carrying the local tracks.
pub struct RtcConnector {
    media: Arc<dyn LocalMedia>,
}

impl RtcConnector {
    pub fn new(media: Arc<dyn LocalMedia>) -> Self {
        Self { media }
    }
}

fn rtc_ice_servers(ice_servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    if ice_servers.is_empty() {
        return vec![RTCIceServer {
            urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
            ..Default::default()
        }];
    }

    ice_servers
        .iter()
        .map(|server| RTCIceServer {
            urls: server.urls.clone(),
            username: server.username.clone().unwrap_or_default(),
            credential: server.credential.clone().unwrap_or_default(),
            ..Default::default()
        })
        .collect()
}

fn transport_state(state: RTCPeerConnectionState) -> TransportState {
    match state {
        RTCPeerConnectionState::Connecting => TransportState::Connecting,
        RTCPeerConnectionState::Connected => TransportState::Connected,
        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
        RTCPeerConnectionState::Failed => TransportState::Failed,
        RTCPeerConnectionState::Closed => TransportState::Closed,
        _ => TransportState::New,
    }
}

#[async_trait]
impl PeerConnector for RtcConnector {
    async fn connect(
        &self,
        remote: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Box<dyn PeerTransport>> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let tracks = self.media.tracks();
        if tracks.is_empty() {
            // Receive-only participant.
            peer_connection
                .add_transceiver_from_kind(RTPCodecType::Audio, None)
                .await?;
            peer_connection
                .add_transceiver_from_kind(RTPCodecType::Video, None)
                .await?;
        }
        for track in tracks {
            let sender = peer_connection.add_track(track).await?;
            // RTCP has to be read for interceptors (NACK, reports) to work.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                info!("Peer connection to {} is {}", remote, s);
                let _ = state_tx.send(LinkEvent::StateChanged {
                    remote,
                    state: transport_state(s),
                });
                Box::pin(async {})
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(LinkEvent::LocalCandidate {
                    remote,
                    candidate: IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    },
                });
            })
        }));

        let track_tx = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                debug!("Remote {} track from {}", track.kind(), remote);
                let _ = track_tx.send(LinkEvent::RemoteTrack {
                    remote,
                    stream_id: track.stream_id(),
                    track_id: track.id(),
                });

                // Nothing renders here; keep the receive buffer drained.
                tokio::spawn(async move { while track.read_rtp().await.is_ok() {} });
                Box::pin(async {})
            },
        ));

        Ok(Box::new(RtcTransport {
            remote,
            peer_connection,
        }))
    }
}
