use huddle_core::ConnectionId;

/// Media received from one remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMediaStream {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub stream_id: String,
    pub track_ids: Vec<String>,
}

impl RemoteMediaStream {
    pub fn new(
        connection_id: ConnectionId,
        display_name: String,
        stream_id: String,
        track_id: String,
    ) -> Self {
        Self {
            connection_id,
            display_name,
            stream_id,
            track_ids: vec![track_id],
        }
    }

    pub fn add_track(&mut self, track_id: String) {
        if !self.track_ids.contains(&track_id) {
            self.track_ids.push(track_id);
        }
    }
}
