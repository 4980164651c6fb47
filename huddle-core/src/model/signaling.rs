use crate::model::connection::ConnectionId;
use crate::model::handshake::HandshakeMessage;
use crate::model::participant::Participant;
use crate::model::rejection::JoinRejection;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Client → server frames.
///
/// `P` is the relayed handshake payload: the typed [`HandshakeMessage`] on
/// clients, an opaque JSON value on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent<P = HandshakeMessage> {
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        token: Option<String>,
    },
    Signal {
        to: ConnectionId,
        data: P,
    },
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent<P = HandshakeMessage> {
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    ExistingUsers(Vec<Participant>),
    UserJoined(Participant),
    UserLeft {
        connection_id: ConnectionId,
    },
    Signal {
        from: ConnectionId,
        data: P,
    },
    Error {
        reason: JoinRejection,
        message: String,
    },
    RoomFull,
}

impl<P> ServerEvent<P> {
    /// `room_full` has a dedicated event; everything else is an `error`.
    pub fn rejected(reason: JoinRejection) -> Self {
        match reason {
            JoinRejection::RoomFull => ServerEvent::RoomFull,
            other => ServerEvent::Error {
                reason: other,
                message: other.to_string(),
            },
        }
    }

    pub fn rejection(&self) -> Option<JoinRejection> {
        match self {
            ServerEvent::RoomFull => Some(JoinRejection::RoomFull),
            ServerEvent::Error { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
