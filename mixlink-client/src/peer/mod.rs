mod backend;
mod negotiation;
mod rtc;

pub use backend::{PeerBackend, PeerConnector, PeerEvent};
pub use negotiation::{NegotiationState, PeerNegotiation};
pub use rtc::RtcPeerConnector;
