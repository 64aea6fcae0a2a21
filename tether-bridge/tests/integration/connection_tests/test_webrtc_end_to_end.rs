use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use tether_bridge::PeerState;

use crate::integration::init_tracing;
use crate::utils::{open_webrtc_pair, wait_for_open};

#[tokio::test]
async fn test_webrtc_end_to_end() {
    init_tracing();

    let (server, client) = open_webrtc_pair().await.expect("Failed to open sessions");

    wait_for_open(&server, 10000)
        .await
        .expect("Server channel not open");
    wait_for_open(&client, 10000)
        .await
        .expect("Client channel not open");

    let server_peer = server.peer().clone();
    let client_peer = client.peer().clone();

    let server_scope = server.scoped(|mut inbound, outbound| async move {
        outbound
            .send(json!({"id": 1}))
            .await
            .expect("Failed to send request");
        // Wait for the reply so the request is known to have crossed.
        tokio::time::timeout(Duration::from_secs(5), inbound.next())
            .await
            .expect("Timeout waiting for reply")
            .expect("Server inbound ended")
            .expect("Reply did not decode")
    });

    let client_scope = client.scoped(|mut inbound, outbound| async move {
        let request = tokio::time::timeout(Duration::from_secs(5), inbound.next())
            .await
            .expect("Timeout waiting for request")
            .expect("Client inbound ended")
            .expect("Request did not decode");
        outbound
            .send(json!({"id": 1, "result": "ok"}))
            .await
            .expect("Failed to send reply");
        // Stay until the server hangs up.
        let _ = tokio::time::timeout(Duration::from_secs(2), inbound.next()).await;
        request
    });

    let (reply, request) = tokio::join!(server_scope, client_scope);
    assert_eq!(request.expect("Client scope failed"), json!({"id": 1}));
    assert_eq!(
        reply.expect("Server scope failed"),
        json!({"id": 1, "result": "ok"})
    );

    assert_eq!(server_peer.connection_state(), PeerState::Closed);
    assert_eq!(client_peer.connection_state(), PeerState::Closed);
}
