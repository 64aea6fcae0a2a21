use std::sync::Arc;
use std::time::Duration;
use tether_bridge::{BridgeParameters, MemorySignaling, PeerState, SessionState, Signaling};
use tether_core::SignalMessage;

use crate::integration::init_tracing;
use crate::utils::open_webrtc;

#[tokio::test]
async fn test_bye_before_description() {
    init_tracing();

    let (remote, local) = MemorySignaling::pair();
    let mut session = open_webrtc(Arc::new(local), BridgeParameters::client())
        .await
        .expect("Failed to open session");

    remote
        .send(SignalMessage::Bye)
        .await
        .expect("Failed to send bye");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(*session.state().borrow(), SessionState::Negotiating);
    assert!(!session.is_open());

    tokio::time::timeout(Duration::from_secs(5), session.close())
        .await
        .expect("Teardown hung")
        .expect("Teardown failed");
    assert_eq!(session.peer().connection_state(), PeerState::Closed);
}
