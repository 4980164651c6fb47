use crate::config::ServerConfig;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub rooms: usize,
    pub connections: usize,
}

/// `GET /ws` for signaling, `GET /health` for liveness checks.
pub fn router(service: SignalingService) -> Router {
    // Browser clients are served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(service)
}

async fn health(State(service): State<SignalingService>) -> Json<Health> {
    Json(Health {
        status: "ok",
        rooms: service.rooms().room_count(),
        connections: service.connections().len(),
    })
}

pub async fn serve(config: &ServerConfig, service: SignalingService) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!("Signaling server listening on http://{}", config.bind);

    axum::serve(listener, router(service))
        .await
        .context("Signaling server stopped")
}
