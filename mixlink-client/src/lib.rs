pub mod auth;
pub mod config;
pub mod error;
pub mod peer;
pub mod roster;
pub mod session;
pub mod transport;

pub use auth::{AuthService, HttpAuthClient};
pub use config::ClientConfig;
pub use error::{NegotiationError, RosterError, SessionError, TransportError};
pub use peer::{
    NegotiationState, PeerBackend, PeerConnector, PeerEvent, PeerNegotiation, RtcPeerConnector,
};
pub use roster::Roster;
pub use session::{LinkStates, SessionController, SessionHandle, SessionSnapshot, SessionState};
pub use transport::SignalingTransport;
