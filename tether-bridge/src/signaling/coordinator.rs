use crate::engine::{EngineError, PeerConnection};
use crate::error::BridgeError;
use crate::relay::Latch;
use crate::signaling::Signaling;
use std::sync::Arc;
use tether_core::{SessionDescription, SessionId, SignalMessage};
use tracing::{debug, info};

/// Applies remote signaling to the peer connection until the remote says bye.
pub struct SignalingCoordinator {
    session: SessionId,
    signaling: Arc<dyn Signaling>,
    peer: Arc<dyn PeerConnection>,
    description_sent: Latch,
    bye: Latch,
}

impl SignalingCoordinator {
    /// `description_sent` is set once the local answer has gone out; `bye`
    /// once the remote has finished signaling.
    pub fn new(
        session: SessionId,
        signaling: Arc<dyn Signaling>,
        peer: Arc<dyn PeerConnection>,
        description_sent: Latch,
        bye: Latch,
    ) -> Self {
        Self {
            session,
            signaling,
            peer,
            description_sent,
            bye,
        }
    }

    pub async fn run(self) -> Result<(), BridgeError> {
        loop {
            match self.signaling.receive().await? {
                SignalMessage::SessionDescription(desc) => self.apply_description(desc).await?,
                SignalMessage::IceCandidate(candidate) => {
                    debug!("Adding remote ICE candidate for {}", self.session);
                    self.peer.add_ice_candidate(candidate).await?;
                }
                SignalMessage::Bye => {
                    info!("Remote finished signaling for session {}", self.session);
                    self.bye.set();
                    return Ok(());
                }
            }
        }
    }

    async fn apply_description(&self, desc: SessionDescription) -> Result<(), BridgeError> {
        let is_offer = desc.is_offer();
        debug!("Applying remote {:?} for {}", desc.kind, self.session);
        self.peer.set_remote_description(desc).await?;
        if !is_offer {
            return Ok(());
        }

        let answer = self.peer.create_answer().await?;
        self.peer.set_local_description(answer).await?;
        let local = self.peer.local_description().await?.ok_or_else(|| {
            EngineError::Negotiation("no local description after answering".to_owned())
        })?;
        self.signaling.send(local.into()).await?;
        self.description_sent.set();
        info!("Sent answer for session {}", self.session);
        Ok(())
    }
}
