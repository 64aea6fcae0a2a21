use crate::engine::EngineError;
use crate::error::BridgeError;
use crate::relay::{ChannelSlot, Readiness, ReadinessGate};
use crate::stream::rendezvous::RendezvousReceiver;
use std::sync::Arc;
use tether_core::{MessageCodec, SessionId};
use tracing::{debug, error};

/// Drains the outbound stream onto the data channel.
pub struct OutboundRelay<C: MessageCodec> {
    session: SessionId,
    messages: RendezvousReceiver<C::Message>,
    codec: Arc<C>,
    gate: ReadinessGate,
    channel: ChannelSlot,
}

impl<C: MessageCodec> OutboundRelay<C> {
    pub fn new(
        session: SessionId,
        messages: RendezvousReceiver<C::Message>,
        codec: Arc<C>,
        gate: ReadinessGate,
        channel: ChannelSlot,
    ) -> Self {
        Self {
            session,
            messages,
            codec,
            gate,
            channel,
        }
    }

    /// Runs until the outbound stream or the channel closes. Only a failed
    /// send on a channel that is still open is an error. The outbound stream
    /// is closed when the channel goes away, so later sends fail.
    pub async fn run(mut self) -> Result<(), BridgeError> {
        loop {
            let message = tokio::select! {
                biased;
                _ = self.gate.wait_closed() => {
                    self.stop();
                    return Ok(());
                }
                message = self.messages.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            let frame = match self.codec.encode(&message) {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Dropping outbound message for session {}: {}", self.session, e);
                    continue;
                }
            };

            if self.gate.ready().await == Readiness::Closed {
                self.stop();
                return Ok(());
            }

            // The gate only opens after the channel has been stored.
            let Some(channel) = self.channel.get() else {
                return Err(EngineError::ChannelNotOpen.into());
            };

            debug!("Sending {} byte frame for session {}", frame.len(), self.session);
            match channel.send(frame).await {
                Ok(()) => {}
                // The engine marks a channel closed before its close callback runs.
                Err(EngineError::ChannelNotOpen) => {
                    debug!("Data channel for {} no longer open", self.session);
                    self.stop();
                    return Ok(());
                }
                Err(e) if self.gate.is_closed() => {
                    debug!("Send raced channel close for {}: {}", self.session, e);
                    self.stop();
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }

        debug!("Outbound stream closed for session {}", self.session);
        Ok(())
    }

    fn stop(&self) {
        debug!("Data channel closed, outbound relay for {} stopping", self.session);
        self.messages.close();
    }
}
