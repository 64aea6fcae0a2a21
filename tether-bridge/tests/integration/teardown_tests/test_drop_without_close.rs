use std::sync::Arc;
use tether_bridge::{PeerConnection, PeerState};

use crate::integration::init_tracing;
use crate::utils::{open_mock_pair, wait_for_open, wait_for_peer_state};

#[tokio::test]
async fn test_drop_without_close() {
    init_tracing();

    let mut pair = open_mock_pair().await.expect("Failed to open sessions");
    wait_for_open(&pair.server, 5000)
        .await
        .expect("Server channel not open");

    let server_peer: Arc<dyn PeerConnection> = pair.server_peer.clone();
    drop(pair.server);

    wait_for_peer_state(&server_peer, PeerState::Closed, 2000)
        .await
        .expect("Dropped session left its peer open");

    pair.client.close().await.expect("Client close failed");
}
