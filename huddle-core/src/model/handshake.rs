use serde::{Deserialize, Serialize};

/// Network-path candidate, using the browser's `RTCIceCandidateInit` field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Payload exchanged between exactly two connections through the relay.
///
/// The coordinator never decodes it; only clients do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HandshakeMessage {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate { candidate: IceCandidate },
}

impl HandshakeMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            HandshakeMessage::Offer { .. } => "offer",
            HandshakeMessage::Answer { .. } => "answer",
            HandshakeMessage::Candidate { .. } => "candidate",
        }
    }
}

impl From<SessionDescription> for HandshakeMessage {
    fn from(desc: SessionDescription) -> Self {
        match desc.kind {
            SdpKind::Offer => HandshakeMessage::Offer { sdp: desc.sdp },
            SdpKind::Answer => HandshakeMessage::Answer { sdp: desc.sdp },
        }
    }
}
