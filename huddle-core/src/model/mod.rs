mod connection;
mod handshake;
mod participant;
mod rejection;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use handshake::{HandshakeMessage, IceCandidate, SdpKind, SessionDescription};
pub use participant::{Participant, ParticipantId, ParticipantIdentity};
pub use rejection::JoinRejection;
pub use room::{MAX_OCCUPANCY, RoomId};
pub use signaling::{ClientEvent, IceServerConfig, ServerEvent};
