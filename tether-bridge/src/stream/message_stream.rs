use crate::error::StreamClosed;
use crate::stream::rendezvous::{CloseHandle, RendezvousReceiver, RendezvousSender};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tether_core::CodecError;

/// Write half handed to the protocol layer. Each `send` resolves once the
/// outbound relay has taken the message.
pub struct OutboundStream<M> {
    tx: RendezvousSender<M>,
}

impl<M> Clone for OutboundStream<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Send> OutboundStream<M> {
    pub(crate) fn new(tx: RendezvousSender<M>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, message: M) -> Result<(), StreamClosed> {
        self.tx.send(message).await
    }

    pub fn close(&self) {
        self.tx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read half handed to the protocol layer. Yields one item per payload that
/// arrived on the data channel, decode failures included.
pub struct InboundStream<M> {
    inner: BoxStream<'static, Result<M, CodecError>>,
    close: CloseHandle,
}

impl<M: Send + 'static> InboundStream<M> {
    pub(crate) fn new(rx: RendezvousReceiver<Result<M, CodecError>>) -> Self {
        let close = rx.close_handle();
        let inner = stream::unfold(rx, |mut rx| async move {
            let item = rx.recv().await?;
            Some((item, rx))
        })
        .boxed();
        Self { inner, close }
    }

    pub async fn recv(&mut self) -> Option<Result<M, CodecError>> {
        self.inner.next().await
    }

    pub fn close(&self) {
        self.close.close();
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_closed()
    }
}

impl<M> Stream for InboundStream<M> {
    type Item = Result<M, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
