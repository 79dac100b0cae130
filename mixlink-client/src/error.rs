use crate::peer::NegotiationState;
use mixlink_core::{Destination, StreamDirection, UserId};
use thiserror::Error;

/// Errors surfaced to the session caller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The inbound subscription could not be opened. Fatal to session
    /// start: no signaling is possible without it.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("{operation} is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: crate::session::SessionState,
    },

    /// The controller task is gone.
    #[error("session closed")]
    Closed,
}

/// Errors scoped to a single media leg. They never propagate to the
/// other leg or to the roster.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("{direction} negotiation failed: {cause}")]
    Failed {
        direction: StreamDirection,
        cause: String,
    },

    #[error("{operation} rejected on {direction} leg in state {state:?}")]
    InvalidStateTransition {
        direction: StreamDirection,
        operation: &'static str,
        state: NegotiationState,
    },

    #[error("ICE candidate rejected on {direction} leg: {reason}")]
    IceRejected {
        direction: StreamDirection,
        reason: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("participant {0} is already in the roster")]
    DuplicateParticipant(UserId),

    #[error("participant {0} is not in the roster")]
    UnknownParticipant(UserId),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    #[error("send to {destination} failed: {reason}")]
    SendFailed {
        destination: Destination,
        reason: String,
    },
}
