use crate::engine::DataChannel;
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};
use tracing::warn;

/// A one-shot boolean flag. It starts unset and can be set exactly once;
/// any number of tasks may wait for it.
#[derive(Debug, Clone)]
pub struct Latch {
    tx: Arc<watch::Sender<bool>>,
}

impl Latch {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Sets the latch. Returns `true` only for the call that flipped it.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|value| {
            if *value {
                false
            } else {
                *value = true;
                true
            }
        })
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the latch is set, immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|value| *value).await;
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Open,
    Closed,
}

/// Open/close latch pair driven by the data channel's lifecycle callbacks.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    opened: Latch,
    closed: Latch,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) -> bool {
        self.opened.set()
    }

    pub fn close(&self) -> bool {
        self.closed.set()
    }

    pub fn is_open(&self) -> bool {
        self.opened.is_set()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }

    /// Waits until the channel is usable. `Closed` wins over `Open` when both
    /// are already set.
    pub async fn ready(&self) -> Readiness {
        if self.closed.is_set() {
            return Readiness::Closed;
        }
        tokio::select! {
            biased;
            _ = self.closed.wait() => Readiness::Closed,
            _ = self.opened.wait() => Readiness::Open,
        }
    }

    pub async fn wait_closed(&self) {
        self.closed.wait().await
    }
}

/// Holds the session's single data channel once it is known.
#[derive(Clone, Default)]
pub struct ChannelSlot {
    cell: Arc<OnceCell<Arc<dyn DataChannel>>>,
}

impl ChannelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the channel. A second channel is ignored and `false` returned.
    pub fn set(&self, channel: Arc<dyn DataChannel>) -> bool {
        let label = channel.label().to_owned();
        match self.cell.set(channel) {
            Ok(()) => true,
            Err(_) => {
                warn!("Ignoring extra data channel '{}'", label);
                false
            }
        }
    }

    pub fn get(&self) -> Option<Arc<dyn DataChannel>> {
        self.cell.get().cloned()
    }
}
