use crate::engine::RtcPeerConnection;
use crate::error::BridgeError;
use crate::session::BridgeSession;
use crate::signaling::Signaling;
use crate::transport::{BridgeParameters, TransportConfig};
use std::sync::Arc;
use tether_core::JsonRpcCodec;

/// A JSON-RPC session over a fresh `webrtc-rs` peer connection.
pub async fn webrtc_transport(
    signaling: Arc<dyn Signaling>,
    params: BridgeParameters,
    config: &TransportConfig,
) -> Result<BridgeSession<JsonRpcCodec>, BridgeError> {
    let peer = RtcPeerConnection::new(config).await?;
    BridgeSession::open(signaling, Arc::new(peer), JsonRpcCodec::new(), params).await
}

/// Answering side: waits for the remote offer and data channel.
pub async fn client_transport(
    signaling: Arc<dyn Signaling>,
    config: &TransportConfig,
) -> Result<BridgeSession<JsonRpcCodec>, BridgeError> {
    webrtc_transport(signaling, BridgeParameters::client(), config).await
}

/// Offering side: creates the data channel and sends the offer.
pub async fn server_transport(
    signaling: Arc<dyn Signaling>,
    config: &TransportConfig,
) -> Result<BridgeSession<JsonRpcCodec>, BridgeError> {
    webrtc_transport(signaling, BridgeParameters::server(), config).await
}
