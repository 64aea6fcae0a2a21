use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tether_bridge::engine::mock::{MockNetwork, MockPeerConnection};
use tether_bridge::{
    BridgeParameters, BridgeSession, MemorySignaling, PeerConnection, PeerState,
    RtcPeerConnection, SessionState, Signaling, TransportConfig,
};
use tether_core::JsonCodec;

pub type JsonSession = BridgeSession<JsonCodec<Value>>;

/// Host candidates only, for loopback tests.
pub fn local_config() -> TransportConfig {
    TransportConfig {
        ice_servers: vec![],
    }
}

/// Open a session over a real webrtc-rs peer connection.
pub async fn open_webrtc(
    signaling: Arc<dyn Signaling>,
    params: BridgeParameters,
) -> Result<JsonSession> {
    let peer = RtcPeerConnection::new(&local_config())
        .await
        .context("Failed to create peer connection")?;
    let session = BridgeSession::open(signaling, Arc::new(peer), JsonCodec::new(), params)
        .await
        .context("Failed to open session")?;
    Ok(session)
}

/// Open a connected (server, client) pair over real webrtc-rs peers.
pub async fn open_webrtc_pair() -> Result<(JsonSession, JsonSession)> {
    let (server_sig, client_sig) = MemorySignaling::pair();
    let client = open_webrtc(Arc::new(client_sig), BridgeParameters::client()).await?;
    let server = open_webrtc(Arc::new(server_sig), BridgeParameters::server()).await?;
    Ok((server, client))
}

pub struct MockPair {
    pub server: JsonSession,
    pub client: JsonSession,
    pub server_peer: Arc<MockPeerConnection>,
    pub client_peer: Arc<MockPeerConnection>,
}

/// Open a connected (server, client) pair over the in-process engine.
pub async fn open_mock_pair() -> Result<MockPair> {
    let network = MockNetwork::new();
    let (server_sig, client_sig) = MemorySignaling::pair();
    let server_peer = network.peer();
    let client_peer = network.peer();

    let client = BridgeSession::open(
        Arc::new(client_sig),
        client_peer.clone(),
        JsonCodec::new(),
        BridgeParameters::client(),
    )
    .await?;
    let server = BridgeSession::open(
        Arc::new(server_sig),
        server_peer.clone(),
        JsonCodec::new(),
        BridgeParameters::server(),
    )
    .await?;

    Ok(MockPair {
        server,
        client,
        server_peer,
        client_peer,
    })
}

/// Wait until the session's data channel is open.
pub async fn wait_for_open(session: &JsonSession, timeout_ms: u64) -> Result<()> {
    let mut state = session.state();
    let reached = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        state.wait_for(|s| *s >= SessionState::Open),
    )
    .await
    .context("Timeout waiting for session to open")?
    .map(|s| *s)?;

    anyhow::ensure!(
        reached == SessionState::Open,
        "Session reached '{}' instead of opening",
        reached
    );
    Ok(())
}

/// Poll the peer connection until it reaches `wanted`.
pub async fn wait_for_peer_state(
    peer: &Arc<dyn PeerConnection>,
    wanted: PeerState,
    timeout_ms: u64,
) -> Result<()> {
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        let state = peer.connection_state();
        if state == wanted {
            return Ok(());
        }
        if start.elapsed() > timeout {
            anyhow::bail!("Timeout waiting for peer state {} (state: {})", wanted, state);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
