use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable identity of a user, taken from the verified credential.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantIdentity {
    pub participant_id: ParticipantId,
    pub display_name: String,
}

/// A connection admitted into a room, as shown to the other occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub participant_id: ParticipantId,
}

impl Participant {
    pub fn new(connection_id: ConnectionId, identity: ParticipantIdentity) -> Self {
        Self {
            connection_id,
            display_name: identity.display_name,
            participant_id: identity.participant_id,
        }
    }
}
