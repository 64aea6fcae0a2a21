use async_trait::async_trait;
use tether_core::SignalMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("signaling channel closed")]
    Closed,

    #[error("signaling transport failed: {0}")]
    Transport(String),
}

/// Duplex channel carrying offers, answers and candidates between the two
/// peers. Implemented by whatever out-of-band transport the application uses.
#[async_trait]
pub trait Signaling: Send + Sync {
    async fn connect(&self) -> Result<(), SignalingError>;

    async fn send(&self, message: SignalMessage) -> Result<(), SignalingError>;

    /// Next message from the remote peer, in send order.
    async fn receive(&self) -> Result<SignalMessage, SignalingError>;

    /// Must be safe to call more than once.
    async fn close(&self) -> Result<(), SignalingError>;
}
