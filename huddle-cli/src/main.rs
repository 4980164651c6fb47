use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use huddle_client::{Call, CallEnd, ClientConfig, RtcConnector, StaticTracks};
use huddle_core::RoomId;
use huddle_server::{InMemoryRoomDirectory, JwtVerifier, ServerConfig, SignalingService, issue_token};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", about = "Mesh video room signaling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve {
        #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,

        #[arg(long, env = "HUDDLE_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Held to 1..=6 whatever the value.
        #[arg(long, env = "HUDDLE_MAX_OCCUPANCY", default_value_t = huddle_core::MAX_OCCUPANCY)]
        max_occupancy: usize,

        /// Room admitted without validation or attendance. Development only.
        #[arg(long, env = "HUDDLE_DEV_ROOM")]
        dev_room: Option<String>,

        /// Scheduled rooms. When none are given every well-formed id is accepted.
        #[arg(long = "room")]
        rooms: Vec<String>,
    },

    /// Mint a development credential.
    Token {
        #[arg(long, env = "HUDDLE_JWT_SECRET", hide_env_values = true)]
        secret: String,

        #[arg(long)]
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value_t = 12)]
        ttl_hours: u64,
    },

    /// Attend a room with silent local tracks until Ctrl-C.
    Join {
        #[arg(long, default_value = "ws://localhost:5000/ws")]
        server: String,

        #[arg(long)]
        room: String,

        #[arg(long, env = "HUDDLE_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            jwt_secret,
            max_occupancy,
            dev_room,
            rooms,
        } => serve(bind, jwt_secret, max_occupancy, dev_room, rooms).await,
        Commands::Token {
            secret,
            id,
            name,
            ttl_hours,
        } => token(&secret, &id, name, ttl_hours),
        Commands::Join {
            server,
            room,
            token,
        } => join(server, room, token).await,
    }
}

async fn serve(
    bind: SocketAddr,
    jwt_secret: String,
    max_occupancy: usize,
    dev_room: Option<String>,
    rooms: Vec<String>,
) -> Result<()> {
    if jwt_secret.trim().is_empty() {
        bail!("The JWT secret must not be empty");
    }

    let config = ServerConfig {
        bind,
        jwt_secret,
        max_occupancy,
        dev_room: dev_room.map(RoomId::new),
        ..ServerConfig::default()
    };

    let directory = if rooms.is_empty() {
        InMemoryRoomDirectory::open()
    } else {
        let directory = InMemoryRoomDirectory::new();
        for room in rooms {
            let room = RoomId::new(room);
            if !room.is_well_formed() {
                warn!("Ignoring malformed room id {}", room);
                continue;
            }
            directory.register(room);
        }
        directory
    };

    let service = SignalingService::new(
        &config,
        Arc::new(JwtVerifier::new(&config.jwt_secret)),
        Arc::new(directory),
    );

    println!("{}", "Starting huddle signaling server...".green().bold());
    println!("   Listening on ws://{}/ws", config.bind);
    println!("   Room capacity: {}", config.capacity());

    huddle_server::serve(&config, service).await
}

fn token(secret: &str, id: &str, name: Option<String>, ttl_hours: u64) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Display name")
            .allow_empty(true)
            .interact_text()?,
    };
    let name = Some(name.trim()).filter(|n| !n.is_empty());

    let token = issue_token(secret, id, name, token_ttl(ttl_hours)?)
        .context("Failed to sign token")?;

    println!("{}", token);
    Ok(())
}

fn token_ttl(hours: u64) -> Result<Duration> {
    let secs = hours
        .checked_mul(3600)
        .with_context(|| format!("A ttl of {} hours is too long", hours))?;
    Ok(Duration::from_secs(secs))
}

async fn join(server: String, room: String, token: String) -> Result<()> {
    let media = Arc::new(StaticTracks::new("huddle-cli"));
    let connector = Arc::new(RtcConnector::new(media.clone()));
    let call = Call::new(ClientConfig::new(server, room.as_str(), token), media, connector);

    let (leave_tx, leave_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Leaving room");
            let _ = leave_tx.send(());
        }
    });

    println!("{} {}", "Joining room".cyan(), room.bold());
    let summary = call.run(leave_rx).await.context("Call failed")?;

    match summary.ended {
        CallEnd::Left => println!("{}", "Left the room.".green().bold()),
        CallEnd::ServerClosed => println!("{}", "Server closed the connection.".yellow().bold()),
    }
    for participant in &summary.participants_seen {
        println!("   met {}", participant.display_name);
    }
    Ok(())
}
