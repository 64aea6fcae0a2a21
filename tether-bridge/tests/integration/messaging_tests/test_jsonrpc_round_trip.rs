use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tether_bridge::{MemorySignaling, client_transport, server_transport};
use tether_core::JsonRpcMessage;

use crate::integration::init_tracing;
use crate::utils::local_config;

#[tokio::test]
async fn test_jsonrpc_round_trip() {
    init_tracing();

    let (server_sig, client_sig) = MemorySignaling::pair();
    let client = client_transport(Arc::new(client_sig), &local_config())
        .await
        .expect("Failed to open client");
    let server = server_transport(Arc::new(server_sig), &local_config())
        .await
        .expect("Failed to open server");

    let server_scope = server.scoped(|mut inbound, outbound| async move {
        let request = tokio::time::timeout(Duration::from_secs(10), inbound.next())
            .await
            .expect("Timeout waiting for request")
            .expect("Server inbound ended")
            .expect("Request did not decode");
        let id = request.id().cloned().expect("Request without id");
        outbound
            .send(JsonRpcMessage::response(id, json!({"tools": []})))
            .await
            .expect("Failed to send response");
        // Stay until the client hangs up.
        let _ = tokio::time::timeout(Duration::from_secs(2), inbound.next()).await;
        request
    });

    let client_scope = client.scoped(|mut inbound, outbound| async move {
        outbound
            .send(JsonRpcMessage::request(1, "tools/list", None))
            .await
            .expect("Failed to send request");
        tokio::time::timeout(Duration::from_secs(10), inbound.next())
            .await
            .expect("Timeout waiting for response")
            .expect("Client inbound ended")
            .expect("Response did not decode")
    });

    let (request, response) = tokio::join!(server_scope, client_scope);
    assert_eq!(
        request.expect("Server scope failed"),
        JsonRpcMessage::request(1, "tools/list", None)
    );
    assert_eq!(
        response.expect("Client scope failed"),
        JsonRpcMessage::response(1, json!({"tools": []}))
    );
}
