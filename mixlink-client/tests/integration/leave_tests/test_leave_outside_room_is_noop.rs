use mixlink_client::SessionState;
use mixlink_core::Destination;

use crate::utils::{create_test_session, init_tracing, wait_for};

#[tokio::test]
async fn leave_before_joining_changes_nothing() {
    init_tracing();
    let session = create_test_session();

    session.handle.login("alice").await.expect("login failed");
    session.handle.leave().await.expect("leave replied");

    let snapshot = wait_for(&session.handle, |s| s.state == SessionState::LoggedIn).await;
    assert!(snapshot.links.is_none());
    assert!(session.transport.sent_to(Destination::UserLeave).await.is_empty());
}

#[tokio::test]
async fn leave_while_logged_out_changes_nothing() {
    init_tracing();
    let session = create_test_session();

    session.handle.leave().await.expect("leave replied");

    let snapshot = wait_for(&session.handle, |s| s.state == SessionState::LoggedOut).await;
    assert!(snapshot.links.is_none());
    assert!(session.transport.sent_to(Destination::UserLeave).await.is_empty());
}
