use crate::SignalingService;
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, ConnectionId};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, service))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, service: SignalingService) {
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.connect(connection_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent<Value>>(&text)
                    {
                        Ok(event) => service.handle_event(connection_id, event).await,
                        Err(e) => warn!("Invalid ClientEvent from {}: {:?}", connection_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            // An aborted task may still be finishing a join on another worker.
            let _ = recv_task.await;
        }
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.disconnect(&connection_id).await;
    info!("WebSocket disconnected: {}", connection_id);
}
