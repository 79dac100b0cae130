use mixlink_client::SessionState;
use mixlink_core::StreamDirection;

use crate::utils::{create_test_session, enter_room, init_tracing, wait_for, wait_for_offers_sent};

#[tokio::test]
async fn subscription_loss_disposes_legs_and_logs_out() {
    init_tracing();
    let session = create_test_session();

    enter_room(&session, r#"[{"id":1,"name":"alice"}]"#).await;
    wait_for_offers_sent(&session.handle).await;

    // The transport drops its side of the subscription mid-session.
    session.transport.close_subscription().await;

    let snapshot = wait_for(&session.handle, |s| s.state == SessionState::LoggedOut).await;
    assert!(snapshot.links.is_none());
    assert_eq!(session.connector.log(StreamDirection::Outbound).disposals(), 1);
    assert_eq!(session.connector.log(StreamDirection::Inbound).disposals(), 1);
}
