use mixlink_client::{ClientConfig, NegotiationState, SessionHandle, SessionSnapshot, SessionState};
use mixlink_core::{ClientRequest, Destination};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use super::mock_auth::MockAuth;
use super::mock_connector::MockConnector;
use super::mock_transport::MockTransport;

/// Timeout for observable session effects (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// The id MockAuth hands out in the default harness.
pub const TEST_USER_ID: u32 = 1;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct TestSession {
    pub handle: SessionHandle,
    pub transport: MockTransport,
    pub connector: MockConnector,
    pub requests: mpsc::UnboundedReceiver<ClientRequest>,
}

pub fn create_test_session() -> TestSession {
    create_test_session_with(MockConnector::new(), ClientConfig::default())
}

pub fn create_test_session_with(connector: MockConnector, config: ClientConfig) -> TestSession {
    let (transport, requests) = MockTransport::new();
    let handle = SessionHandle::spawn(
        Arc::new(MockAuth::new(TEST_USER_ID)),
        Arc::new(transport.clone()),
        Arc::new(connector.clone()),
        config,
    );
    TestSession {
        handle,
        transport,
        connector,
        requests,
    }
}

/// login → join → roster snapshot with the given users payload.
pub async fn enter_room(session: &TestSession, users_json: &str) {
    session.handle.login("alice").await.expect("login failed");
    session.handle.join().await.expect("join failed");
    // The snapshot frame must not overtake the join command on the
    // dispatch loop.
    wait_for(&session.handle, |s| s.state == SessionState::Joining).await;
    session
        .transport
        .push_frame(&format!(
            r#"{{"id":"WEBRTC_ROOM_USERS","data":{{"users":{users_json}}}}}"#
        ))
        .await;
}

/// Wait until both legs report OfferSent (the default bring-up endpoint).
pub async fn wait_for_offers_sent(handle: &SessionHandle) -> SessionSnapshot {
    wait_for(handle, |snapshot| {
        snapshot.links.is_some_and(|links| {
            links.outbound == NegotiationState::OfferSent
                && links.inbound == NegotiationState::OfferSent
        })
    })
    .await
}

/// Poll snapshots until `pred` holds or the timeout elapses.
pub async fn wait_for<F>(handle: &SessionHandle, mut pred: F) -> SessionSnapshot
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);
    loop {
        let snapshot = handle.snapshot().await.expect("session loop gone");
        if pred(&snapshot) {
            return snapshot;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("condition not met in time; last snapshot: {snapshot:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Wait for the next captured request addressed to `destination`,
/// skipping requests for other destinations.
pub async fn wait_for_request(
    requests: &mut mpsc::UnboundedReceiver<ClientRequest>,
    destination: Destination,
) -> ClientRequest {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);
    loop {
        match tokio::time::timeout(Duration::from_millis(100), requests.recv()).await {
            Ok(Some(request)) if request.destination() == destination => return request,
            Ok(Some(_)) => continue,
            Ok(None) => panic!("request channel closed"),
            Err(_) if tokio::time::Instant::now() < deadline => continue,
            Err(_) => panic!("no {destination} request within timeout"),
        }
    }
}
