use crate::error::BridgeError;
use crate::relay::Latch;
use crate::signaling::{Signaling, SignalingError};
use std::sync::Arc;
use tether_core::{IceCandidate, SessionId};
use tokio::sync::mpsc;
use tracing::debug;

/// Trickles locally gathered candidates to the remote, never ahead of the
/// local description they belong to.
pub struct CandidateForwarder {
    session: SessionId,
    signaling: Arc<dyn Signaling>,
    candidates: mpsc::UnboundedReceiver<IceCandidate>,
    description_sent: Latch,
    bye: Latch,
}

impl CandidateForwarder {
    pub fn new(
        session: SessionId,
        signaling: Arc<dyn Signaling>,
        candidates: mpsc::UnboundedReceiver<IceCandidate>,
        description_sent: Latch,
        bye: Latch,
    ) -> Self {
        Self {
            session,
            signaling,
            candidates,
            description_sent,
            bye,
        }
    }

    pub async fn run(mut self) -> Result<(), BridgeError> {
        tokio::select! {
            biased;
            _ = self.bye.wait() => return Ok(()),
            _ = self.description_sent.wait() => {}
        }

        loop {
            let candidate = tokio::select! {
                biased;
                _ = self.bye.wait() => break,
                candidate = self.candidates.recv() => match candidate {
                    Some(candidate) => candidate,
                    None => break,
                },
            };

            debug!("Sending local ICE candidate for {}", self.session);
            match self.signaling.send(candidate.into()).await {
                Ok(()) => {}
                Err(SignalingError::Closed) => {
                    debug!("Signaling closed, no more candidates for {}", self.session);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
