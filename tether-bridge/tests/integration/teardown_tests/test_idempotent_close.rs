use futures::StreamExt;
use serde_json::json;
use tether_bridge::{PeerState, SessionState, StreamClosed};

use crate::integration::init_tracing;
use crate::utils::{open_webrtc_pair, wait_for_open};

#[tokio::test]
async fn test_idempotent_close() {
    init_tracing();

    let (mut server, mut client) = open_webrtc_pair().await.expect("Failed to open sessions");
    wait_for_open(&server, 10000)
        .await
        .expect("Server channel not open");

    let (mut inbound, outbound) = server.take_streams().expect("Streams taken");

    server.close().await.expect("First close failed");
    server.close().await.expect("Second close failed");
    inbound.close();
    outbound.close();

    assert_eq!(*server.state().borrow(), SessionState::Closed);
    assert_eq!(outbound.send(json!({"id": 1})).await, Err(StreamClosed));
    assert!(inbound.next().await.is_none());
    assert_eq!(server.peer().connection_state(), PeerState::Closed);

    client.close().await.expect("Client close failed");
    client.close().await.expect("Second client close failed");
}
