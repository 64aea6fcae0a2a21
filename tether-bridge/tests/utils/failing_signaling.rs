use async_trait::async_trait;
use tether_bridge::{Signaling, SignalingError};
use tether_core::SignalMessage;

/// Signaling whose `connect` always fails.
pub struct UnreachableSignaling;

#[async_trait]
impl Signaling for UnreachableSignaling {
    async fn connect(&self) -> Result<(), SignalingError> {
        tracing::debug!("[UnreachableSignaling] refusing connect");
        Err(SignalingError::Transport("signaling server unreachable".into()))
    }

    async fn send(&self, _message: SignalMessage) -> Result<(), SignalingError> {
        Err(SignalingError::Closed)
    }

    async fn receive(&self) -> Result<SignalMessage, SignalingError> {
        Err(SignalingError::Closed)
    }

    async fn close(&self) -> Result<(), SignalingError> {
        Ok(())
    }
}
