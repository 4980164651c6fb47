use huddle_core::RoomId;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the coordinator, e.g. `ws://localhost:5000/ws`.
    pub server_url: String,
    pub room_id: RoomId,
    pub credential: String,
}

impl ClientConfig {
    pub fn new(
        server_url: impl Into<String>,
        room_id: impl Into<RoomId>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            room_id: room_id.into(),
            credential: credential.into(),
        }
    }
}
