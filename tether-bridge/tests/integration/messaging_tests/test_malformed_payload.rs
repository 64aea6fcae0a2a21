use futures::StreamExt;
use serde_json::json;
use tether_bridge::DataChannel;
use tether_core::{CodecError, Frame};

use crate::integration::init_tracing;
use crate::utils::{open_mock_pair, wait_for_open};

#[tokio::test]
async fn test_malformed_payload() {
    init_tracing();

    let mut pair = open_mock_pair().await.expect("Failed to open sessions");
    wait_for_open(&pair.server, 5000)
        .await
        .expect("Server channel not open");

    let (_server_in, server_out) = pair.server.take_streams().expect("Streams taken");
    let (mut client_in, _client_out) = pair.client.take_streams().expect("Streams taken");

    // Bypass the codec and put garbage straight on the wire.
    let raw = pair.server_peer.channels()[0].clone();
    raw.send(Frame::Text("not-json".into()))
        .await
        .expect("Failed to send raw frame");
    server_out
        .send(json!({"id": 2}))
        .await
        .expect("Failed to send");

    let first = client_in.next().await.expect("Client inbound ended");
    assert!(
        matches!(first, Err(CodecError::Malformed(_))),
        "Expected a decode failure, got {:?}",
        first
    );

    let second = client_in.next().await.expect("Client inbound ended");
    assert_eq!(second.expect("Message did not decode"), json!({"id": 2}));

    pair.server.close().await.expect("Failed to close server");
    pair.client.close().await.expect("Failed to close client");
}
