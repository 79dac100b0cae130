use crate::error::TransportError;
use async_trait::async_trait;
use mixlink_core::{ClientRequest, UserId};
use tokio::sync::mpsc;

/// The publish/subscribe channel the session signals over.
///
/// One inbound stream of raw frames per identity, in arrival order; no
/// ordering is guaranteed across message kinds. Outbound sends are
/// fire-and-forget: the controller logs failures and moves on.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Open the per-identity inbound stream. Failure here is fatal to
    /// session start.
    async fn subscribe(&self, user_id: UserId) -> Result<mpsc::Receiver<String>, TransportError>;

    async fn send(&self, request: ClientRequest) -> Result<(), TransportError>;
}
