use crate::error::NegotiationError;
use crate::peer::backend::PeerBackend;
use mixlink_core::{IceCandidate, StreamDirection};
use tracing::{debug, warn};

/// Negotiation progress of one media leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Created,
    OfferPending,
    OfferSent,
    Answered,
    IceExchanging,
    Established,
    Disposed,
}

/// One one-directional WebRTC negotiation.
///
/// Owned exclusively by the session controller and mutated only on its
/// dispatch path. Remote candidates racing the offer/answer exchange are
/// buffered until the offer has gone out, then replayed in arrival order.
pub struct PeerNegotiation {
    direction: StreamDirection,
    state: NegotiationState,
    backend: Option<Box<dyn PeerBackend>>,
    pending_remote: Vec<IceCandidate>,
    buffer_limit: usize,
}

impl PeerNegotiation {
    pub fn new(
        direction: StreamDirection,
        backend: Box<dyn PeerBackend>,
        buffer_limit: usize,
    ) -> Self {
        Self {
            direction,
            state: NegotiationState::Created,
            backend: Some(backend),
            pending_remote: Vec::new(),
            buffer_limit,
        }
    }

    /// A leg whose backend never came up. Terminal from the start so the
    /// controller keeps its two-units invariant without a live backend.
    pub fn failed(direction: StreamDirection) -> Self {
        Self {
            direction,
            state: NegotiationState::Disposed,
            backend: None,
            pending_remote: Vec::new(),
            buffer_limit: 0,
        }
    }

    pub fn direction(&self) -> StreamDirection {
        self.direction
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == NegotiationState::Disposed
    }

    /// Offer generation has been kicked off on the backend.
    pub fn begin_offer(&mut self) {
        if self.state == NegotiationState::Created {
            self.state = NegotiationState::OfferPending;
        }
    }

    /// The local offer went out on the wire. Replays any remote
    /// candidates that raced it, in arrival order.
    pub async fn offer_sent(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::OfferPending {
            return Err(NegotiationError::InvalidStateTransition {
                direction: self.direction,
                operation: "offer_sent",
                state: self.state,
            });
        }
        self.state = NegotiationState::OfferSent;

        if let Some(backend) = self.backend.as_ref() {
            for candidate in self.pending_remote.drain(..) {
                if let Err(e) = backend.add_ice_candidate(candidate).await {
                    warn!(
                        "Buffered candidate rejected on {} leg: {:?}",
                        self.direction, e
                    );
                }
            }
        }
        Ok(())
    }

    /// Apply the relay's SDP answer. Valid only once, in OfferSent.
    pub async fn process_answer(&mut self, sdp: String) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::OfferSent {
            return Err(NegotiationError::InvalidStateTransition {
                direction: self.direction,
                operation: "process_answer",
                state: self.state,
            });
        }

        let Some(backend) = self.backend.as_ref() else {
            return Err(NegotiationError::Failed {
                direction: self.direction,
                cause: "backend already released".to_owned(),
            });
        };
        backend
            .process_answer(sdp)
            .await
            .map_err(|e| NegotiationError::Failed {
                direction: self.direction,
                cause: e.to_string(),
            })?;
        self.state = NegotiationState::Answered;
        Ok(())
    }

    /// Apply (or buffer) one remote ICE candidate.
    pub async fn add_remote_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::Disposed => {
                debug!("Dropping remote candidate for disposed {} leg", self.direction);
                Ok(())
            }
            NegotiationState::Created | NegotiationState::OfferPending => {
                if self.pending_remote.len() >= self.buffer_limit {
                    return Err(NegotiationError::IceRejected {
                        direction: self.direction,
                        reason: "candidate buffer full".to_owned(),
                    });
                }
                self.pending_remote.push(candidate);
                Ok(())
            }
            _ => {
                let Some(backend) = self.backend.as_ref() else {
                    return Err(NegotiationError::IceRejected {
                        direction: self.direction,
                        reason: "backend already released".to_owned(),
                    });
                };
                backend.add_ice_candidate(candidate).await.map_err(|e| {
                    NegotiationError::IceRejected {
                        direction: self.direction,
                        reason: e.to_string(),
                    }
                })?;
                if self.state == NegotiationState::Answered {
                    self.state = NegotiationState::IceExchanging;
                }
                Ok(())
            }
        }
    }

    /// The underlying connection reports media-level connectivity.
    pub fn mark_connected(&mut self) {
        if self.state != NegotiationState::Disposed {
            self.state = NegotiationState::Established;
        }
    }

    /// Release the backend. Idempotent; discards buffered candidates and
    /// everything still in flight.
    pub async fn dispose(&mut self) {
        if let Some(backend) = self.backend.take() {
            backend.dispose().await;
        }
        self.pending_remote.clear();
        self.state = NegotiationState::Disposed;
    }
}
