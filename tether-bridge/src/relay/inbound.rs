use crate::stream::rendezvous::RendezvousSender;
use bytes::Bytes;
use std::sync::Arc;
use tether_core::{CodecError, MessageCodec, SessionId};
use tracing::debug;

/// Decodes channel payloads into the inbound stream. Installed as the data
/// channel's message handler.
pub struct InboundRelay<C: MessageCodec> {
    session: SessionId,
    codec: Arc<C>,
    sink: RendezvousSender<Result<C::Message, CodecError>>,
}

impl<C: MessageCodec> Clone for InboundRelay<C> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            codec: self.codec.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<C: MessageCodec> InboundRelay<C> {
    pub fn new(
        session: SessionId,
        codec: Arc<C>,
        sink: RendezvousSender<Result<C::Message, CodecError>>,
    ) -> Self {
        Self {
            session,
            codec,
            sink,
        }
    }

    /// Forwards one payload, blocking until the consumer takes it.
    pub async fn deliver(&self, payload: Bytes) {
        if self.sink.is_closed() {
            debug!("Inbound stream closed, dropping payload for {}", self.session);
            return;
        }

        let item = self.codec.decode(&payload);
        if let Err(e) = &item {
            debug!("Undecodable payload for session {}: {}", self.session, e);
        }

        if self.sink.send(item).await.is_err() {
            debug!("Inbound stream closed during delivery for {}", self.session);
        }
    }
}
