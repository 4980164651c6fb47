use crate::error::ClientError;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket link to the coordinator.
pub struct SignalingClient {
    pub outbound: mpsc::UnboundedSender<ClientEvent>,
    pub inbound: mpsc::UnboundedReceiver<ServerEvent>,
    send_task: JoinHandle<()>,
    recv_task: JoinHandle<()>,
}

impl SignalingClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::Signaling(format!("connect to {}: {}", url, e)))?;
        info!("Connected to signaling server {}", url);

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        let send_task = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {:?}: {}", event, e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let recv_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if inbound_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ServerEvent: {:?}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("Signaling stream ended");
        });

        Ok(Self {
            outbound,
            inbound,
            send_task,
            recv_task,
        })
    }

    /// Flush pending frames, close the socket and stop both pumps.
    pub async fn shutdown(self) {
        let Self {
            outbound,
            inbound,
            send_task,
            recv_task,
        } = self;

        drop(outbound);
        drop(inbound);
        let _ = send_task.await;
        recv_task.abort();
    }
}
