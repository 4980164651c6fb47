use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::media::LocalMedia;
use crate::peer::{PeerConnector, PeerManager};
use crate::signaling::SignalingClient;
use huddle_core::{ClientEvent, Participant, ServerEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEnd {
    /// The local user asked to leave.
    Left,
    /// The coordinator went away.
    ServerClosed,
}

#[derive(Debug, Clone)]
pub struct CallSummary {
    pub ended: CallEnd,
    /// Everyone met during the call, for the post-call feedback form.
    pub participants_seen: Vec<Participant>,
    /// Links that had completed their handshake when the call ended.
    pub connected_at_end: usize,
}

/// One attendance of one room.
///
/// Local media and every peer link are acquired together and released
/// together, whichever way the call ends.
pub struct Call {
    config: ClientConfig,
    media: Arc<dyn LocalMedia>,
    connector: Arc<dyn PeerConnector>,
}

enum Flow {
    Continue,
    End(Result<CallEnd, ClientError>),
}

impl Call {
    pub fn new(
        config: ClientConfig,
        media: Arc<dyn LocalMedia>,
        connector: Arc<dyn PeerConnector>,
    ) -> Self {
        Self {
            config,
            media,
            connector,
        }
    }

    /// Run until `leave` fires, the server closes, or the join is refused.
    pub async fn run(self, leave: oneshot::Receiver<()>) -> Result<CallSummary, ClientError> {
        self.media.start().await?;

        let result = self.session(leave).await;

        self.media.stop().await;
        result
    }

    async fn session(&self, mut leave: oneshot::Receiver<()>) -> Result<CallSummary, ClientError> {
        let mut signaling = SignalingClient::connect(&self.config.server_url).await?;

        let (link_tx, mut link_rx) = mpsc::unbounded_channel();
        let mut peers = PeerManager::new(
            self.connector.clone(),
            signaling.outbound.clone(),
            link_tx,
        );

        let join = ClientEvent::JoinRoom {
            room_id: self.config.room_id.clone(),
            token: Some(self.config.credential.clone()),
        };
        let outcome = if signaling.outbound.send(join).is_err() {
            Err(ClientError::Signaling("connection closed before join".to_owned()))
        } else {
            info!("Joining room {}", self.config.room_id);

            loop {
                let flow = tokio::select! {
                    _ = &mut leave => Flow::End(Ok(CallEnd::Left)),
                    event = signaling.inbound.recv() => match event {
                        Some(event) => dispatch(&mut peers, event).await,
                        None => Flow::End(Ok(CallEnd::ServerClosed)),
                    },
                    Some(event) = link_rx.recv() => {
                        peers.on_link_event(event).await;
                        Flow::Continue
                    }
                };

                if let Flow::End(outcome) = flow {
                    break outcome;
                }
            }
        };

        let connected_at_end = peers.connected_count();
        peers.teardown().await;
        let participants_seen = peers.participants_seen().to_vec();
        // The manager holds a sender; the socket only closes once it is gone.
        drop(peers);
        signaling.shutdown().await;

        let ended = outcome?;
        info!(
            "Call ended ({:?}), met {} participant(s)",
            ended,
            participants_seen.len()
        );
        Ok(CallSummary {
            ended,
            participants_seen,
            connected_at_end,
        })
    }
}

async fn dispatch(peers: &mut PeerManager, event: ServerEvent) -> Flow {
    match event {
        ServerEvent::IceConfig { ice_servers } => peers.on_ice_config(ice_servers),
        ServerEvent::ExistingUsers(roster) => peers.on_roster(roster).await,
        ServerEvent::UserJoined(participant) => peers.on_participant_joined(participant).await,
        ServerEvent::UserLeft { connection_id } => peers.on_participant_left(connection_id).await,
        ServerEvent::Signal { from, data } => peers.on_handshake(from, data).await,
        ServerEvent::Error { .. } | ServerEvent::RoomFull => {
            let Some(reason) = event.rejection() else {
                return Flow::Continue;
            };
            warn!("Join refused: {}", reason);
            return Flow::End(Err(ClientError::Rejected(reason)));
        }
    }
    Flow::Continue
}
