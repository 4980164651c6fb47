use huddle_core::{ConnectionId, Participant};
use tokio::sync::oneshot;

/// Commands a room actor accepts from the signaling layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// Admit a verified participant if there is room for it.
    Join {
        participant: Participant,
        reply: oneshot::Sender<Admission>,
    },

    /// The connection went away. Unknown ids are ignored.
    Leave { connection_id: ConnectionId },

    /// Snapshot of current members, in join order.
    Members {
        reply: oneshot::Sender<Vec<Participant>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Admitted; carries the members that were already present.
    Admitted(Vec<Participant>),
    Full,
    /// The actor emptied out and shut down before handling the request.
    Closed,
}
