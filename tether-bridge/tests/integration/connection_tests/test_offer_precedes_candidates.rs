use std::sync::Arc;
use tether_bridge::{BridgeParameters, MemorySignaling};
use tether_core::SignalMessage;

use crate::integration::init_tracing;
use crate::utils::{RecordingSignaling, open_webrtc, wait_for_open};

#[tokio::test]
async fn test_offer_precedes_candidates() {
    init_tracing();

    let (server_sig, client_sig) = MemorySignaling::pair();
    let server_sig = RecordingSignaling::new(server_sig);
    let client_sig = RecordingSignaling::new(client_sig);

    let mut client = open_webrtc(Arc::new(client_sig.clone()), BridgeParameters::client())
        .await
        .expect("Failed to open client");
    let mut server = open_webrtc(Arc::new(server_sig.clone()), BridgeParameters::server())
        .await
        .expect("Failed to open server");

    wait_for_open(&client, 10000)
        .await
        .expect("Client channel not open");

    let offered = server_sig.sent().await;
    assert!(
        matches!(offered.first(), Some(SignalMessage::SessionDescription(d)) if d.is_offer()),
        "Server must send the offer first, sent {:?}",
        offered
    );

    let answered = client_sig.sent().await;
    assert!(
        matches!(answered.first(), Some(SignalMessage::SessionDescription(d)) if !d.is_offer()),
        "Client must send the answer first, sent {:?}",
        answered
    );
    assert!(
        answered[1..]
            .iter()
            .all(|m| matches!(m, SignalMessage::IceCandidate(_))),
        "Only candidates may follow the answer"
    );

    server.close().await.expect("Failed to close server");
    client.close().await.expect("Failed to close client");
}
