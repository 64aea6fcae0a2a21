use crate::relay::Latch;
use crate::signaling::{Signaling, SignalingError};
use async_trait::async_trait;
use tether_core::SignalMessage;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// One end of an in-process signaling pair.
pub struct MemorySignaling {
    tx: mpsc::UnboundedSender<SignalMessage>,
    rx: Mutex<mpsc::UnboundedReceiver<SignalMessage>>,
    closed: Latch,
}

impl MemorySignaling {
    /// Two endpoints wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self::new(a_tx, b_rx), Self::new(b_tx, a_rx))
    }

    fn new(tx: mpsc::UnboundedSender<SignalMessage>, rx: mpsc::UnboundedReceiver<SignalMessage>) -> Self {
        Self {
            tx,
            rx: Mutex::new(rx),
            closed: Latch::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }
}

#[async_trait]
impl Signaling for MemorySignaling {
    async fn connect(&self) -> Result<(), SignalingError> {
        if self.closed.is_set() {
            return Err(SignalingError::Closed);
        }
        Ok(())
    }

    async fn send(&self, message: SignalMessage) -> Result<(), SignalingError> {
        if self.closed.is_set() {
            return Err(SignalingError::Closed);
        }
        self.tx.send(message).map_err(|_| SignalingError::Closed)
    }

    async fn receive(&self) -> Result<SignalMessage, SignalingError> {
        if self.closed.is_set() {
            return Err(SignalingError::Closed);
        }

        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            _ = self.closed.wait() => Err(SignalingError::Closed),
            // A vanished remote reads as a goodbye.
            message = rx.recv() => Ok(message.unwrap_or(SignalMessage::Bye)),
        }
    }

    async fn close(&self) -> Result<(), SignalingError> {
        if self.closed.set() {
            debug!("Closing memory signaling endpoint");
            let _ = self.tx.send(SignalMessage::Bye);
        }
        Ok(())
    }
}
