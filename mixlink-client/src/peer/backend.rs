use anyhow::Result;
use async_trait::async_trait;
use mixlink_core::{IceCandidate, StreamDirection};
use tokio::sync::mpsc;

/// Events a peer backend feeds into the session loop.
#[derive(Debug)]
pub enum PeerEvent {
    /// The local offer is ready to go on the wire. Always precedes any
    /// `LocalCandidate` for the same leg: ICE gathering starts only once
    /// a local description exists.
    OfferReady {
        direction: StreamDirection,
        sdp: String,
    },
    /// A locally gathered candidate to trickle out. Never batched.
    LocalCandidate {
        direction: StreamDirection,
        candidate: IceCandidate,
    },
    Connected {
        direction: StreamDirection,
    },
    Failed {
        direction: StreamDirection,
        cause: String,
    },
}

/// Factory for one-directional peer connections.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Wire up a new peer connection for `direction` and kick off offer
    /// generation. Must not block on negotiation: the offer and all
    /// subsequent signals arrive on `events`, so the two legs of a
    /// session never wait on each other.
    async fn connect(
        &self,
        direction: StreamDirection,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerBackend>>;
}

/// One live one-directional peer connection.
#[async_trait]
pub trait PeerBackend: Send + Sync {
    async fn process_answer(&self, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Release the underlying media/network resources. Idempotent.
    async fn dispose(&self);
}
