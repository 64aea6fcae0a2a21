use serde::Deserialize;
use tether_core::{DEFAULT_CHANNEL_NAME, SessionRole};

/// Configuration for the WebRTC engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// STUN/TURN urls. Empty means host candidates only.
    pub ice_servers: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}

/// Per-session settings of a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeParameters {
    pub role: SessionRole,
    /// Label of the single data channel.
    pub channel_name: String,
}

impl BridgeParameters {
    pub fn new(role: SessionRole) -> Self {
        Self {
            role,
            channel_name: DEFAULT_CHANNEL_NAME.to_owned(),
        }
    }

    /// Waits for the remote offer and data channel.
    pub fn client() -> Self {
        Self::new(SessionRole::Responder)
    }

    /// Creates the data channel and sends the offer.
    pub fn server() -> Self {
        Self::new(SessionRole::Initiator)
    }

    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }
}

impl Default for BridgeParameters {
    fn default() -> Self {
        Self::client()
    }
}
