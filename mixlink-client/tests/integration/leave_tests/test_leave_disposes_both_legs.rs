use mixlink_client::SessionState;
use mixlink_core::{Destination, StreamDirection};

use crate::utils::{create_test_session, enter_room, init_tracing, wait_for_offers_sent};

#[tokio::test]
async fn leave_disposes_both_legs_and_notifies_the_room() {
    init_tracing();
    let session = create_test_session();

    enter_room(&session, r#"[{"id":1,"name":"alice"}]"#).await;
    wait_for_offers_sent(&session.handle).await;

    session.handle.leave().await.expect("leave failed");

    // The reply only fires after both disposals completed.
    assert_eq!(session.connector.log(StreamDirection::Outbound).disposals(), 1);
    assert_eq!(session.connector.log(StreamDirection::Inbound).disposals(), 1);
    assert_eq!(session.transport.sent_to(Destination::UserLeave).await.len(), 1);

    let snapshot = session.handle.snapshot().await.expect("session loop gone");
    assert_eq!(snapshot.state, SessionState::LoggedOut);
    assert!(snapshot.links.is_none());
    assert!(snapshot.participants.is_empty());
}

#[tokio::test]
async fn leave_mid_negotiation_is_safe() {
    init_tracing();
    let connector = crate::utils::MockConnector::without_auto_offer();
    let session =
        crate::utils::create_test_session_with(connector, mixlink_client::ClientConfig::default());

    enter_room(&session, "[]").await;
    crate::utils::wait_for(&session.handle, |s| s.links.is_some()).await;

    // Offers are still pending; teardown must not wait for them.
    session.handle.leave().await.expect("leave failed");
    assert_eq!(session.connector.log(StreamDirection::Outbound).disposals(), 1);
    assert_eq!(session.connector.log(StreamDirection::Inbound).disposals(), 1);

    // A late offer callback is discarded, not forwarded.
    session.connector.emit_offer(StreamDirection::Outbound).await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(session.transport.sent_to(Destination::UserOffer).await.is_empty());
}

#[tokio::test]
async fn second_leave_is_a_noop() {
    init_tracing();
    let session = create_test_session();

    enter_room(&session, r#"[{"id":1,"name":"alice"}]"#).await;
    wait_for_offers_sent(&session.handle).await;

    session.handle.leave().await.expect("leave failed");
    session.handle.leave().await.expect("leave failed");

    assert_eq!(session.connector.log(StreamDirection::Outbound).disposals(), 1);
    assert_eq!(session.connector.log(StreamDirection::Inbound).disposals(), 1);
    assert_eq!(session.transport.sent_to(Destination::UserLeave).await.len(), 1);
}
