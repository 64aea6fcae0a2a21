use async_trait::async_trait;
use std::sync::Arc;
use tether_bridge::{MemorySignaling, Signaling, SignalingError};
use tether_core::SignalMessage;
use tokio::sync::Mutex;

/// Wraps a [`MemorySignaling`] endpoint and keeps a copy of everything sent.
#[derive(Clone)]
pub struct RecordingSignaling {
    inner: Arc<MemorySignaling>,
    sent: Arc<Mutex<Vec<SignalMessage>>>,
}

impl RecordingSignaling {
    pub fn new(inner: MemorySignaling) -> Self {
        Self {
            inner: Arc::new(inner),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All messages sent so far, in order.
    pub async fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Signaling for RecordingSignaling {
    async fn connect(&self) -> Result<(), SignalingError> {
        self.inner.connect().await
    }

    async fn send(&self, message: SignalMessage) -> Result<(), SignalingError> {
        tracing::debug!("[RecordingSignaling] send {:?}", message);
        self.sent.lock().await.push(message.clone());
        self.inner.send(message).await
    }

    async fn receive(&self) -> Result<SignalMessage, SignalingError> {
        self.inner.receive().await
    }

    async fn close(&self) -> Result<(), SignalingError> {
        self.inner.close().await
    }
}
