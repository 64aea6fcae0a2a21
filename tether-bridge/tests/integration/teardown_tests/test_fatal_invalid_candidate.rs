use std::sync::Arc;
use std::time::Duration;
use tether_bridge::engine::mock::MockNetwork;
use tether_bridge::{
    BridgeError, BridgeParameters, BridgeSession, EngineError, MemorySignaling, PeerConnection,
    PeerState, Signaling,
};
use tether_core::{IceCandidate, JsonCodec};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_fatal_invalid_candidate() {
    init_tracing();

    let network = MockNetwork::new();
    let remote_peer = network.peer();
    let local_peer = network.peer();
    let (remote, local) = MemorySignaling::pair();

    let session = BridgeSession::open(
        Arc::new(local),
        local_peer.clone(),
        JsonCodec::<serde_json::Value>::new(),
        BridgeParameters::client(),
    )
    .await
    .expect("Failed to open session");

    let offer = remote_peer.create_offer().await.expect("Failed to offer");
    remote.send(offer.into()).await.expect("Failed to send offer");
    remote
        .send(IceCandidate::new("candidate:not a real candidate").into())
        .await
        .expect("Failed to send candidate");

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        session.scoped(|_inbound, _outbound| std::future::pending::<()>()),
    )
    .await
    .expect("Fatal error did not end the scope");

    assert!(
        matches!(result, Err(BridgeError::Engine(EngineError::Negotiation(_)))),
        "Unexpected result: {:?}",
        result
    );
    assert_eq!(local_peer.connection_state(), PeerState::Closed);
}
