use mixlink_client::SessionState;
use mixlink_core::UserId;

use crate::utils::{create_test_session, enter_room, init_tracing, wait_for};

#[tokio::test]
async fn roster_snapshot_is_applied_wholesale() {
    init_tracing();
    let session = create_test_session();

    enter_room(
        &session,
        r#"[{"id":1,"name":"alice"},{"id":2,"name":"bob"},{"id":5,"name":"eve"}]"#,
    )
    .await;

    let snapshot = wait_for(&session.handle, |s| s.state == SessionState::InRoom).await;
    assert_eq!(
        snapshot.participants,
        vec![UserId(1), UserId(2), UserId(5)]
    );
}

#[tokio::test]
async fn roster_snapshot_outside_joining_is_dropped() {
    init_tracing();
    let session = create_test_session();

    session.handle.login("alice").await.expect("login failed");
    // Still LoggedIn: the snapshot must not move the session into a room.
    session
        .transport
        .push_frame(r#"{"id":"WEBRTC_ROOM_USERS","data":{"users":[{"id":9,"name":"mallory"}]}}"#)
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let snapshot = session.handle.snapshot().await.expect("session loop gone");
    assert_eq!(snapshot.state, SessionState::LoggedIn);
    assert!(snapshot.participants.is_empty());
    assert!(snapshot.links.is_none());
}
