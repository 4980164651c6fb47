use huddle_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use huddle_core::{IceServerConfig, MAX_OCCUPANCY, RoomId};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// HS256 secret shared with whoever issues participant tokens.
    pub jwt_secret: String,
    pub max_occupancy: usize,
    /// Legacy test room admitted without reference validation, lookup or
    /// attendance. Off unless explicitly configured.
    pub dev_room: Option<RoomId>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ServerConfig {
    /// Configured occupancy, held to the mesh limit.
    pub fn capacity(&self) -> usize {
        self.max_occupancy.clamp(1, MAX_OCCUPANCY)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            jwt_secret: String::new(),
            max_occupancy: MAX_OCCUPANCY,
            dev_room: None,
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
