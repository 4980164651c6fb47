use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on connections admitted into one room.
pub const MAX_OCCUPANCY: usize = 6;

const ROOM_REFERENCE_LEN: usize = 24;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A room reference is the 24 hex digit key of a scheduled session.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ROOM_REFERENCE_LEN && self.0.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
