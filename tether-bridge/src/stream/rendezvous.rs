//! Zero-buffer handoff channel.
//!
//! `send` resolves only after a receiver has taken the item. An item whose
//! `send` was cancelled is never delivered. Closing either end, or a detached
//! [`CloseHandle`], fails pending and future sends and ends the receiver.

use crate::error::StreamClosed;
use crate::relay::Latch;
use tokio::sync::{mpsc, oneshot};

type Envelope<T> = (T, oneshot::Sender<()>);

pub fn channel<T: Send>() -> (RendezvousSender<T>, RendezvousReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    let closed = Latch::new();
    (
        RendezvousSender {
            tx,
            closed: closed.clone(),
        },
        RendezvousReceiver { rx, closed },
    )
}

/// Closes a rendezvous channel without owning either end.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    closed: Latch,
}

impl CloseHandle {
    /// Returns `true` if this call closed the channel.
    pub fn close(&self) -> bool {
        self.closed.set()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }
}

pub struct RendezvousSender<T> {
    tx: mpsc::Sender<Envelope<T>>,
    closed: Latch,
}

impl<T> Clone for RendezvousSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            closed: self.closed.clone(),
        }
    }
}

impl<T: Send> RendezvousSender<T> {
    pub async fn send(&self, item: T) -> Result<(), StreamClosed> {
        if self.closed.is_set() {
            return Err(StreamClosed);
        }

        let permit = tokio::select! {
            biased;
            _ = self.closed.wait() => return Err(StreamClosed),
            permit = self.tx.reserve() => permit.map_err(|_| StreamClosed)?,
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        permit.send((item, ack_tx));

        tokio::select! {
            biased;
            ack = ack_rx => ack.map_err(|_| StreamClosed),
            _ = self.closed.wait() => Err(StreamClosed),
        }
    }

    pub fn close(&self) -> bool {
        self.closed.set()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closed: self.closed.clone(),
        }
    }
}

pub struct RendezvousReceiver<T> {
    rx: mpsc::Receiver<Envelope<T>>,
    closed: Latch,
}

impl<T: Send> RendezvousReceiver<T> {
    /// Takes the next item, or `None` once the channel is closed or every
    /// sender is gone.
    pub async fn recv(&mut self) -> Option<T> {
        if self.closed.is_set() {
            return None;
        }

        loop {
            let (item, ack) = tokio::select! {
                biased;
                _ = self.closed.wait() => return None,
                envelope = self.rx.recv() => envelope?,
            };
            // A failed ack means the sender was cancelled; its item is withdrawn.
            if ack.send(()).is_ok() {
                return Some(item);
            }
        }
    }

    pub fn close(&self) -> bool {
        self.closed.set()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_set()
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closed: self.closed.clone(),
        }
    }
}
