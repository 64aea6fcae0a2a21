use futures::StreamExt;
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{open_mock_pair, wait_for_open};

#[tokio::test]
async fn test_message_order_preserved() {
    init_tracing();

    let mut pair = open_mock_pair().await.expect("Failed to open sessions");
    wait_for_open(&pair.client, 5000)
        .await
        .expect("Client channel not open");

    let (mut server_in, server_out) = pair.server.take_streams().expect("Streams taken");
    let (mut client_in, client_out) = pair.client.take_streams().expect("Streams taken");

    let message_count = 50;
    let sender = tokio::spawn(async move {
        for i in 0..message_count {
            server_out
                .send(json!({"id": i}))
                .await
                .expect("Failed to send");
        }
    });

    for i in 0..message_count {
        let message = client_in
            .next()
            .await
            .expect("Client inbound ended")
            .expect("Message did not decode");
        assert_eq!(message, json!({"id": i}), "Message {} out of order", i);
    }
    sender.await.expect("Sender panicked");

    // And the other direction.
    client_out
        .send(json!({"id": "back"}))
        .await
        .expect("Failed to send");
    let message = server_in
        .next()
        .await
        .expect("Server inbound ended")
        .expect("Message did not decode");
    assert_eq!(message, json!({"id": "back"}));

    pair.server.close().await.expect("Failed to close server");
    pair.client.close().await.expect("Failed to close client");
}
