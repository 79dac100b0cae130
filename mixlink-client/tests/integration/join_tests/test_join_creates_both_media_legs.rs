use mixlink_client::SessionState;
use mixlink_core::{ClientRequest, Destination, StreamDirection, UserId};

use crate::utils::{
    TEST_USER_ID, create_test_session, enter_room, init_tracing, offer_sdp, wait_for_offers_sent,
    wait_for_request,
};

#[tokio::test]
async fn empty_room_entry_brings_up_two_offering_legs() {
    init_tracing();
    let mut session = create_test_session();

    enter_room(&session, "[]").await;

    let join = wait_for_request(&mut session.requests, Destination::UserJoin).await;
    assert_eq!(
        join,
        ClientRequest::Join {
            user_id: UserId(TEST_USER_ID)
        }
    );

    // Two independent negotiations, one offer per destination.
    let user_offer = wait_for_request(&mut session.requests, Destination::UserOffer).await;
    let mixer_offer = wait_for_request(&mut session.requests, Destination::MixerOffer).await;
    assert_eq!(
        user_offer,
        ClientRequest::Offer {
            direction: StreamDirection::Outbound,
            sdp: offer_sdp(StreamDirection::Outbound),
        }
    );
    assert_eq!(
        mixer_offer,
        ClientRequest::Offer {
            direction: StreamDirection::Inbound,
            sdp: offer_sdp(StreamDirection::Inbound),
        }
    );

    let snapshot = wait_for_offers_sent(&session.handle).await;
    assert_eq!(snapshot.state, SessionState::InRoom);
    assert!(snapshot.participants.is_empty());

    assert_eq!(
        session.transport.sent_to(Destination::UserOffer).await.len(),
        1
    );
    assert_eq!(
        session
            .transport
            .sent_to(Destination::MixerOffer)
            .await
            .len(),
        1
    );
}
