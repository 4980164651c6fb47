use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, IceServerConfig, RoomId, ServerEvent};
use huddle_server::{SignalingService, router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected server event (ms).
pub const RECV_TIMEOUT_MS: u64 = 5000;

/// Serve `service` on an ephemeral loopback port.
pub async fn spawn_server(service: SignalingService) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router(service)).await;
    });

    Ok(addr)
}

/// Raw WebSocket participant speaking the signaling protocol.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl TestClient {
    /// Connect and consume the `ice-config` greeting.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to open WebSocket")?;

        let mut client = Self {
            ws,
            ice_servers: Vec::new(),
        };

        match client.recv().await? {
            ServerEvent::IceConfig { ice_servers } => client.ice_servers = ice_servers,
            other => bail!("Expected ice-config, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        self.ws.send(Message::Text(json)).await?;
        Ok(())
    }

    pub async fn join(&mut self, room: &str, token: Option<String>) -> Result<()> {
        self.send(&ClientEvent::JoinRoom {
            room_id: RoomId::from(room),
            token,
        })
        .await
    }

    pub async fn recv(&mut self) -> Result<ServerEvent> {
        let timeout = Duration::from_millis(RECV_TIMEOUT_MS);

        loop {
            let msg = tokio::time::timeout(timeout, self.ws.next())
                .await
                .context("Timeout waiting for server event")?
                .context("Socket closed")??;

            match msg {
                Message::Text(text) => {
                    return serde_json::from_str(&text).context("Undecodable server event");
                }
                Message::Close(_) => bail!("Server closed the socket"),
                _ => continue,
            }
        }
    }

    /// Assert nothing arrives for `ms` milliseconds.
    pub async fn expect_silence(&mut self, ms: u64) -> Result<()> {
        match tokio::time::timeout(Duration::from_millis(ms), self.ws.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("Unexpected event: {}", text),
            Ok(other) => bail!("Unexpected socket activity: {:?}", other),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
