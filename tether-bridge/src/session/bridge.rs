use crate::engine::{DataChannel, EngineError, PeerConnection};
use crate::error::{BridgeError, StreamClosed};
use crate::relay::{ChannelSlot, InboundRelay, Latch, OutboundRelay, ReadinessGate};
use crate::session::state::{SessionState, advance};
use crate::signaling::{CandidateForwarder, Signaling, SignalingCoordinator};
use crate::stream::rendezvous::{self, CloseHandle};
use crate::stream::{InboundStream, OutboundStream};
use crate::transport::BridgeParameters;
use std::future::Future;
use std::sync::Arc;
use tether_core::{MessageCodec, SessionId, SessionRole};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

type TaskResult = Result<(), BridgeError>;

/// A data channel bridged to a pair of message streams.
///
/// Created by [`BridgeSession::open`]. The session owns the peer connection
/// and runs signaling, candidate trickling and the outbound relay as
/// background tasks until [`close`](Self::close) tears everything down.
pub struct BridgeSession<C: MessageCodec> {
    id: SessionId,
    params: BridgeParameters,
    signaling: Arc<dyn Signaling>,
    peer: Arc<dyn PeerConnection>,
    gate: ReadinessGate,
    state: Arc<watch::Sender<SessionState>>,
    streams: Option<(InboundStream<C::Message>, OutboundStream<C::Message>)>,
    inbound: CloseHandle,
    outbound: CloseHandle,
    tasks: JoinSet<TaskResult>,
    closed: bool,
}

/// Everything the data channel callbacks need.
struct ChannelWiring<C: MessageCodec> {
    session: SessionId,
    gate: ReadinessGate,
    slot: ChannelSlot,
    state: Arc<watch::Sender<SessionState>>,
    relay: InboundRelay<C>,
    inbound: CloseHandle,
}

impl<C: MessageCodec> Clone for ChannelWiring<C> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            gate: self.gate.clone(),
            slot: self.slot.clone(),
            state: self.state.clone(),
            relay: self.relay.clone(),
            inbound: self.inbound.clone(),
        }
    }
}

impl<C: MessageCodec> ChannelWiring<C> {
    fn attach(&self, channel: Arc<dyn DataChannel>) {
        if !self.slot.set(channel.clone()) {
            return;
        }
        info!(
            "Data channel '{}' attached to session {}",
            channel.label(),
            self.session
        );

        let relay = self.relay.clone();
        channel.on_message(Box::new(move |data| {
            let relay = relay.clone();
            Box::pin(async move {
                relay.deliver(data).await;
            })
        }));

        let on_open = self.clone();
        channel.on_open(Box::new(move || {
            Box::pin(async move {
                on_open.mark_open();
            })
        }));

        let on_close = self.clone();
        channel.on_close(Box::new(move || {
            let on_close = on_close.clone();
            Box::pin(async move {
                on_close.mark_closed();
            })
        }));

        if channel.is_open() {
            self.mark_open();
        }
    }

    fn mark_open(&self) {
        if self.gate.open() {
            info!("Data channel open for session {}", self.session);
            advance(&self.state, SessionState::Open);
        }
    }

    fn mark_closed(&self) {
        if self.gate.close() {
            info!("Data channel closed for session {}", self.session);
            // Readers see end of stream once the channel is gone.
            self.inbound.close();
        }
    }
}

impl<C: MessageCodec> BridgeSession<C> {
    /// Connects signaling, performs this side's half of the initial
    /// negotiation and starts the background tasks.
    ///
    /// On failure everything created so far is closed before the error is
    /// returned.
    pub async fn open(
        signaling: Arc<dyn Signaling>,
        peer: Arc<dyn PeerConnection>,
        codec: C,
        params: BridgeParameters,
    ) -> Result<Self, BridgeError> {
        let id = SessionId::new();
        info!(
            "Opening {} session {} on channel '{}'",
            params.role, id, params.channel_name
        );

        let codec = Arc::new(codec);
        let (state, _) = watch::channel(SessionState::Connecting);
        let state = Arc::new(state);
        let gate = ReadinessGate::new();
        let slot = ChannelSlot::new();
        let (out_tx, out_rx) = rendezvous::channel();
        let (in_tx, in_rx) = rendezvous::channel();
        let outbound = out_tx.close_handle();
        let inbound = in_rx.close_handle();

        let description_sent = Latch::new();
        let bye = Latch::new();

        let (candidate_tx, candidate_rx) = mpsc::unbounded_channel();
        peer.on_ice_candidate(Box::new(move |candidate| {
            let candidate_tx = candidate_tx.clone();
            Box::pin(async move {
                match candidate {
                    Some(candidate) => {
                        let _ = candidate_tx.send(candidate);
                    }
                    None => debug!("Local ICE gathering complete"),
                }
            })
        }));

        let wiring = ChannelWiring {
            session: id,
            gate: gate.clone(),
            slot: slot.clone(),
            state: state.clone(),
            relay: InboundRelay::new(id, codec.clone(), in_tx),
            inbound: inbound.clone(),
        };

        if let Err(e) = negotiate(&signaling, &peer, &params, wiring, &description_sent).await {
            warn!("Setup of session {} failed: {}", id, e);
            if let Err(close_err) = peer.close().await {
                warn!("Failed to close peer connection for {}: {}", id, close_err);
            }
            if let Err(close_err) = signaling.close().await {
                warn!("Failed to close signaling for {}: {}", id, close_err);
            }
            state.send_replace(SessionState::Closed);
            return Err(e);
        }
        advance(&state, SessionState::Negotiating);

        let mut tasks = JoinSet::new();
        tasks.spawn(
            SignalingCoordinator::new(
                id,
                signaling.clone(),
                peer.clone(),
                description_sent.clone(),
                bye.clone(),
            )
            .run(),
        );
        tasks.spawn(
            CandidateForwarder::new(id, signaling.clone(), candidate_rx, description_sent, bye)
                .run(),
        );
        tasks.spawn(OutboundRelay::new(id, out_rx, codec, gate.clone(), slot).run());

        Ok(Self {
            id,
            params,
            signaling,
            peer,
            gate,
            state,
            streams: Some((InboundStream::new(in_rx), OutboundStream::new(out_tx))),
            inbound,
            outbound,
            tasks,
            closed: false,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn role(&self) -> SessionRole {
        self.params.role
    }

    pub fn channel_name(&self) -> &str {
        &self.params.channel_name
    }

    pub fn peer(&self) -> &Arc<dyn PeerConnection> {
        &self.peer
    }

    /// Watches the session lifecycle.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.gate.is_open() && !self.gate.is_closed()
    }

    /// Hands out the message streams. Returns `None` after the first call.
    pub fn take_streams(
        &mut self,
    ) -> Option<(InboundStream<C::Message>, OutboundStream<C::Message>)> {
        self.streams.take()
    }

    /// Resolves with the first error a background task fails with. Tasks that
    /// finish cleanly are skipped; if all do, this never resolves.
    pub async fn fatal(&mut self) -> BridgeError {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = task_outcome(result) {
                return e;
            }
        }
        std::future::pending().await
    }

    /// Runs `f` with the session's streams, then closes the session whatever
    /// happened. A background task failure cancels `f` and is returned.
    pub async fn scoped<F, Fut, T>(mut self, f: F) -> Result<T, BridgeError>
    where
        F: FnOnce(InboundStream<C::Message>, OutboundStream<C::Message>) -> Fut,
        Fut: Future<Output = T>,
    {
        let Some((inbound, outbound)) = self.take_streams() else {
            self.close().await?;
            return Err(StreamClosed.into());
        };

        let outcome = tokio::select! {
            value = f(inbound, outbound) => Ok(value),
            e = self.fatal() => Err(e),
        };

        let closed = self.close().await;
        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Tears the session down: outbound stream, inbound stream, peer
    /// connection, signaling, then background tasks. Every step runs even if
    /// an earlier one fails.
    ///
    /// Returns the first error a task produced before teardown began. Calling
    /// it again is a no-op.
    pub async fn close(&mut self) -> Result<(), BridgeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        advance(&self.state, SessionState::Closing);
        info!("Closing session {}", self.id);

        let mut first_error = None;
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = task_outcome(result) {
                first_error.get_or_insert(e);
            }
        }

        self.outbound.close();
        self.inbound.close();
        if let Err(e) = self.peer.close().await {
            warn!("Failed to close peer connection for {}: {}", self.id, e);
        }
        if let Err(e) = self.signaling.close().await {
            warn!("Failed to close signaling for {}: {}", self.id, e);
        }
        self.gate.close();

        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = task_outcome(result) {
                debug!("Ignoring task error during teardown of {}: {}", self.id, e);
            }
        }

        self.state.send_replace(SessionState::Closed);
        info!("Session {} closed", self.id);
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<C: MessageCodec> Drop for BridgeSession<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!("Session {} dropped without close", self.id);
        self.outbound.close();
        self.inbound.close();
        self.gate.close();
        self.tasks.abort_all();

        let peer = self.peer.clone();
        let signaling = self.signaling.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = peer.close().await;
                let _ = signaling.close().await;
            });
        }
        self.state.send_replace(SessionState::Closed);
    }
}

async fn negotiate<C: MessageCodec>(
    signaling: &Arc<dyn Signaling>,
    peer: &Arc<dyn PeerConnection>,
    params: &BridgeParameters,
    wiring: ChannelWiring<C>,
    description_sent: &Latch,
) -> Result<(), BridgeError> {
    signaling.connect().await?;

    match params.role {
        SessionRole::Initiator => {
            let channel = peer.create_data_channel(&params.channel_name).await?;
            wiring.attach(channel);

            let offer = peer.create_offer().await?;
            peer.set_local_description(offer).await?;
            let local = peer.local_description().await?.ok_or_else(|| {
                EngineError::Negotiation("no local description after offering".to_owned())
            })?;
            signaling.send(local.into()).await?;
            description_sent.set();
            debug!("Sent offer for session {}", wiring.session);
        }
        SessionRole::Responder => {
            peer.on_data_channel(Box::new(move |channel| {
                let wiring = wiring.clone();
                Box::pin(async move {
                    wiring.attach(channel);
                })
            }));
        }
    }
    Ok(())
}

fn task_outcome(result: Result<TaskResult, JoinError>) -> TaskResult {
    match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(BridgeError::TaskPanicked(e.to_string())),
    }
}
