use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::error::{NegotiationError, SessionError};
use crate::peer::{NegotiationState, PeerConnector, PeerEvent, PeerNegotiation};
use crate::roster::Roster;
use crate::session::command::SessionCommand;
use crate::transport::SignalingTransport;
use mixlink_core::{ClientRequest, Envelope, IceCandidate, Identity, StreamDirection, UserId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, warn};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
    Joining,
    InRoom,
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStates {
    pub outbound: NegotiationState,
    pub inbound: NegotiationState,
}

/// Point-in-time view of the session, for callers and tests.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub participants: Vec<UserId>,
    pub links: Option<LinkStates>,
}

/// Both media legs of an active room session. Created together on the
/// roster snapshot, disposed together on leave: the controller holds
/// zero or two negotiations, never one.
struct MediaLinks {
    outbound: PeerNegotiation,
    inbound: PeerNegotiation,
}

impl MediaLinks {
    fn get_mut(&mut self, direction: StreamDirection) -> &mut PeerNegotiation {
        match direction {
            StreamDirection::Outbound => &mut self.outbound,
            StreamDirection::Inbound => &mut self.inbound,
        }
    }

    fn states(&self) -> LinkStates {
        LinkStates {
            outbound: self.outbound.state(),
            inbound: self.inbound.state(),
        }
    }

    fn all_settled(&self) -> bool {
        [&self.outbound, &self.inbound].iter().all(|unit| {
            matches!(
                unit.state(),
                NegotiationState::Established | NegotiationState::Disposed
            )
        })
    }

    async fn dispose_all(&mut self) {
        self.outbound.dispose().await;
        self.inbound.dispose().await;
    }
}

/// Owns the whole signaling session: identity, roster and the two peer
/// negotiations, all mutated on one dispatch loop.
///
/// Inbound envelopes, negotiation callbacks and caller commands are
/// processed one at a time, so state transitions need no locks.
pub struct SessionController {
    auth: Arc<dyn AuthService>,
    transport: Arc<dyn SignalingTransport>,
    connector: Arc<dyn PeerConnector>,
    config: ClientConfig,
    state: SessionState,
    identity: Option<Identity>,
    roster: Roster,
    links: Option<MediaLinks>,
    command_rx: mpsc::Receiver<SessionCommand>,
    frame_rx: Option<mpsc::Receiver<String>>,
    peer_tx: mpsc::Sender<PeerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    deadline: Option<Instant>,
}

impl SessionController {
    pub fn new(
        auth: Arc<dyn AuthService>,
        transport: Arc<dyn SignalingTransport>,
        connector: Arc<dyn PeerConnector>,
        config: ClientConfig,
        command_rx: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let (peer_tx, peer_rx) = mpsc::channel(64);

        Self {
            auth,
            transport,
            connector,
            config,
            state: SessionState::LoggedOut,
            identity: None,
            roster: Roster::new(),
            links: None,
            command_rx,
            frame_rx: None,
            peer_tx,
            peer_rx,
            deadline: None,
        }
    }

    pub async fn run(mut self) {
        info!("Session event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            break;
                        }
                    }
                }

                Some(event) = self.peer_rx.recv() => {
                    self.handle_peer_event(event).await;
                }

                frame = Self::next_frame(&mut self.frame_rx) => {
                    match frame {
                        Some(frame) => self.handle_frame(&frame).await,
                        None => self.handle_subscription_lost().await,
                    }
                }

                _ = Self::deadline_elapsed(&self.deadline) => {
                    self.handle_negotiation_deadline().await;
                }
            }
        }

        if let Some(mut links) = self.links.take() {
            links.dispose_all().await;
        }
        info!("Session event loop finished");
    }

    async fn next_frame(rx: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
        match rx {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn deadline_elapsed(deadline: &Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(*at).await,
            None => std::future::pending().await,
        }
    }

    /// Returns true when the loop should stop.
    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Login { name, reply } => {
                let _ = reply.send(self.handle_login(&name).await);
            }
            SessionCommand::Join => self.handle_join().await,
            SessionCommand::Leave { reply } => {
                self.handle_leave().await;
                let _ = reply.send(());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => return true,
        }
        false
    }

    async fn handle_login(&mut self, name: &str) -> Result<Identity, SessionError> {
        if self.state != SessionState::LoggedOut {
            warn!("login ignored in state {:?}", self.state);
            return Err(SessionError::InvalidState {
                operation: "login",
                state: self.state,
            });
        }

        let identity = timeout(self.config.request_timeout, self.auth.login(name))
            .await
            .map_err(|_| SessionError::LoginFailed("login timed out".to_owned()))?
            .map_err(|e| SessionError::LoginFailed(e.to_string()))?;

        let frames = timeout(
            self.config.request_timeout,
            self.transport.subscribe(identity.id),
        )
        .await
        .map_err(|_| SessionError::TransportUnavailable("subscribe timed out".to_owned()))?
        .map_err(|e| SessionError::TransportUnavailable(e.to_string()))?;

        info!("Logged in as {} ({})", identity.name, identity.id);
        self.frame_rx = Some(frames);
        self.identity = Some(identity.clone());
        self.state = SessionState::LoggedIn;
        Ok(identity)
    }

    async fn handle_join(&mut self) {
        if self.state != SessionState::LoggedIn {
            warn!("join ignored in state {:?}", self.state);
            return;
        }
        let Some(identity) = self.identity.as_ref() else {
            warn!("join ignored: no identity");
            return;
        };
        let user_id = identity.id;
        self.state = SessionState::Joining;
        self.send(ClientRequest::Join { user_id }).await;
    }

    async fn handle_leave(&mut self) {
        if self.state != SessionState::InRoom {
            warn!("leave ignored in state {:?}", self.state);
            return;
        }
        self.state = SessionState::Leaving;

        // Both disposals complete before the transition is done.
        if let Some(mut links) = self.links.take() {
            links.dispose_all().await;
        }
        self.send(ClientRequest::Leave).await;

        if let Some(identity) = self.identity.take() {
            if self.roster.remove(identity.id).is_err() {
                debug!("Own roster entry already gone");
            }
            info!("Left room as {}", identity.name);
        }
        self.frame_rx = None;
        self.deadline = None;
        self.state = SessionState::LoggedOut;
    }

    async fn handle_frame(&mut self, frame: &str) {
        let envelope = match Envelope::decode(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping malformed frame: {}", e);
                return;
            }
        };
        self.dispatch(envelope).await;
    }

    async fn dispatch(&mut self, envelope: Envelope) {
        match (self.state, envelope) {
            (SessionState::Joining, Envelope::RoomUsers { users }) => {
                info!("Entered room with {} participant(s)", users.len());
                self.roster.apply_snapshot(users);
                self.state = SessionState::InRoom;
                self.open_media_links().await;
            }
            (SessionState::InRoom, Envelope::UserAdded { user }) => {
                info!("Participant {} ({}) joined", user.name, user.id);
                if let Err(e) = self.roster.add(user) {
                    warn!("Roster add ignored: {}", e);
                }
            }
            (SessionState::InRoom, Envelope::UserLeft { user }) => {
                info!("Participant {} ({}) left", user.name, user.id);
                if let Err(e) = self.roster.remove(user.id) {
                    warn!("Roster remove ignored: {}", e);
                }
            }
            (SessionState::InRoom, Envelope::OutboundAnswer { sdp }) => {
                self.route_answer(StreamDirection::Outbound, sdp).await;
            }
            (SessionState::InRoom, Envelope::InboundAnswer { sdp }) => {
                self.route_answer(StreamDirection::Inbound, sdp).await;
            }
            (SessionState::InRoom, Envelope::OutboundCandidate(candidate)) => {
                self.route_candidate(StreamDirection::Outbound, candidate)
                    .await;
            }
            (SessionState::InRoom, Envelope::InboundCandidate(candidate)) => {
                self.route_candidate(StreamDirection::Inbound, candidate)
                    .await;
            }
            (state, envelope) => {
                warn!("Dropping {} envelope in state {:?}", envelope.kind(), state);
            }
        }
    }

    /// Kick off both negotiations. A failed connect still installs a
    /// terminal unit, so the other leg keeps going and the two-units
    /// invariant holds.
    async fn open_media_links(&mut self) {
        let outbound = self.open_link(StreamDirection::Outbound).await;
        let inbound = self.open_link(StreamDirection::Inbound).await;
        self.links = Some(MediaLinks { outbound, inbound });
        self.deadline = Some(Instant::now() + self.config.negotiation_timeout);
    }

    async fn open_link(&self, direction: StreamDirection) -> PeerNegotiation {
        match self.connector.connect(direction, self.peer_tx.clone()).await {
            Ok(backend) => {
                let mut unit =
                    PeerNegotiation::new(direction, backend, self.config.candidate_buffer);
                unit.begin_offer();
                unit
            }
            Err(e) => {
                error!(
                    "{}",
                    NegotiationError::Failed {
                        direction,
                        cause: e.to_string(),
                    }
                );
                PeerNegotiation::failed(direction)
            }
        }
    }

    async fn route_answer(&mut self, direction: StreamDirection, sdp: String) {
        let Some(links) = self.links.as_mut() else {
            warn!("Dropping answer for {} leg: no media links", direction);
            return;
        };
        let unit = links.get_mut(direction);
        match unit.process_answer(sdp).await {
            Ok(()) => info!("Answer applied on {} leg", direction),
            Err(e @ NegotiationError::Failed { .. }) => {
                // Isolated to this leg; the other negotiation continues.
                error!("{}", e);
                unit.dispose().await;
            }
            Err(e) => warn!("{}", e),
        }
    }

    async fn route_candidate(&mut self, direction: StreamDirection, candidate: IceCandidate) {
        let Some(links) = self.links.as_mut() else {
            warn!("Dropping candidate for {} leg: no media links", direction);
            return;
        };
        if let Err(e) = links.get_mut(direction).add_remote_candidate(candidate).await {
            warn!("{}", e);
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        let Some(links) = self.links.as_mut() else {
            debug!("Discarding peer event with no active media links");
            return;
        };

        let outbound_request = match event {
            PeerEvent::OfferReady { direction, sdp } => {
                let unit = links.get_mut(direction);
                if unit.is_disposed() {
                    debug!("Discarding offer for disposed {} leg", direction);
                    None
                } else {
                    match unit.offer_sent().await {
                        Ok(()) => Some(ClientRequest::Offer { direction, sdp }),
                        Err(e) => {
                            warn!("{}", e);
                            None
                        }
                    }
                }
            }
            PeerEvent::LocalCandidate {
                direction,
                candidate,
            } => {
                if links.get_mut(direction).is_disposed() {
                    debug!("Discarding local candidate for disposed {} leg", direction);
                    None
                } else {
                    // Trickled straight out, never batched.
                    Some(ClientRequest::Candidate {
                        direction,
                        candidate,
                    })
                }
            }
            PeerEvent::Connected { direction } => {
                info!("Media established on {} leg", direction);
                links.get_mut(direction).mark_connected();
                None
            }
            PeerEvent::Failed { direction, cause } => {
                error!("{}", NegotiationError::Failed { direction, cause });
                links.get_mut(direction).dispose().await;
                None
            }
        };

        if self.links.as_ref().is_some_and(MediaLinks::all_settled) {
            self.deadline = None;
        }
        if let Some(request) = outbound_request {
            self.send(request).await;
        }
    }

    async fn handle_negotiation_deadline(&mut self) {
        self.deadline = None;
        let Some(links) = self.links.as_mut() else {
            return;
        };
        for unit in [&mut links.outbound, &mut links.inbound] {
            if !matches!(
                unit.state(),
                NegotiationState::Established | NegotiationState::Disposed
            ) {
                error!(
                    "Negotiation timed out on {} leg in state {:?}",
                    unit.direction(),
                    unit.state()
                );
                unit.dispose().await;
            }
        }
    }

    async fn handle_subscription_lost(&mut self) {
        warn!("Subscription channel closed by transport");
        self.frame_rx = None;
        if let Some(mut links) = self.links.take() {
            links.dispose_all().await;
        }
        self.identity = None;
        self.deadline = None;
        self.state = SessionState::LoggedOut;
    }

    /// Fire-and-forget send; failures are diagnostics, not session errors.
    async fn send(&self, request: ClientRequest) {
        let destination = request.destination();
        if let Err(e) = self.transport.send(request).await {
            warn!("Send to {} failed: {}", destination, e);
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            participants: self.roster.ids(),
            links: self.links.as_ref().map(MediaLinks::states),
        }
    }
}
