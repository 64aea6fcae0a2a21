//! In-process engine for tests.
//!
//! Peers created from the same [`MockNetwork`] negotiate with placeholder SDP
//! (`mock-offer:<id>`, `mock-answer:<id>`). When the offering side applies
//! the answer, every channel it created gets a counterpart on the answering
//! side, the answerer's data-channel handler fires and both ends open.

use crate::engine::{
    DataChannel, EngineError, OnCloseHdlrFn, OnDataChannelHdlrFn, OnIceCandidateHdlrFn,
    OnMessageHdlrFn, OnOpenHdlrFn, PeerConnection, PeerState,
};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use tether_core::{Frame, IceCandidate, SdpKind, SessionDescription};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

const OFFER_PREFIX: &str = "mock-offer:";
const ANSWER_PREFIX: &str = "mock-answer:";
const CANDIDATE_PREFIX: &str = "mock-candidate:";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Registry of mock peers that can find each other by id.
#[derive(Default)]
pub struct MockNetwork {
    peers: DashMap<Uuid, Weak<MockPeerConnection>>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peer(self: &Arc<Self>) -> Arc<MockPeerConnection> {
        let peer = Arc::new(MockPeerConnection::new(self.clone()));
        self.peers.insert(peer.id, Arc::downgrade(&peer));
        peer
    }

    fn find(&self, id: &Uuid) -> Option<Arc<MockPeerConnection>> {
        self.peers.get(id).and_then(|peer| peer.upgrade())
    }
}

pub struct MockPeerConnection {
    id: Uuid,
    network: Arc<MockNetwork>,
    state: Mutex<PeerState>,
    local: Mutex<Option<SessionDescription>>,
    remote: Mutex<Option<SessionDescription>>,
    channels: Mutex<Vec<Arc<MockDataChannel>>>,
    remote_candidates: Mutex<Vec<IceCandidate>>,
    on_data_channel: Mutex<Option<OnDataChannelHdlrFn>>,
    on_ice_candidate: Mutex<Option<OnIceCandidateHdlrFn>>,
    closed: AtomicBool,
}

impl MockPeerConnection {
    fn new(network: Arc<MockNetwork>) -> Self {
        Self {
            id: Uuid::new_v4(),
            network,
            state: Mutex::new(PeerState::New),
            local: Mutex::new(None),
            remote: Mutex::new(None),
            channels: Mutex::new(Vec::new()),
            remote_candidates: Mutex::new(Vec::new()),
            on_data_channel: Mutex::new(None),
            on_ice_candidate: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The candidate string this peer gathers.
    pub fn candidate(&self) -> IceCandidate {
        IceCandidate::new(format!("{CANDIDATE_PREFIX}{}", self.id))
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        lock(&self.remote).clone()
    }

    pub fn remote_candidates(&self) -> Vec<IceCandidate> {
        lock(&self.remote_candidates).clone()
    }

    /// Channels owned by this peer, created locally or by the remote.
    pub fn channels(&self) -> Vec<Arc<MockDataChannel>> {
        lock(&self.channels).clone()
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        Ok(())
    }

    fn set_state(&self, state: PeerState) {
        *lock(&self.state) = state;
    }

    fn parse_peer(&self, desc: &SessionDescription) -> Result<Uuid, EngineError> {
        let prefix = match desc.kind {
            SdpKind::Offer => OFFER_PREFIX,
            SdpKind::Answer => ANSWER_PREFIX,
        };
        desc.sdp
            .strip_prefix(prefix)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| EngineError::Negotiation(format!("unparseable sdp '{}'", desc.sdp)))
    }

    async fn emit_candidate(&self) {
        let candidate = self.candidate();
        let gathered = lock(&self.on_ice_candidate)
            .as_mut()
            .map(|f| (f(Some(candidate)), f(None)));
        if let Some((candidate, done)) = gathered {
            candidate.await;
            done.await;
        }
    }

    /// Pairs every local channel with a new one on `remote` and opens both.
    async fn link(&self, remote: &MockPeerConnection) {
        self.set_state(PeerState::Connected);
        remote.set_state(PeerState::Connected);

        for local in self.channels() {
            let counterpart = MockDataChannel::detached(local.label());
            local.pair_with(&counterpart);
            counterpart.pair_with(&local);
            lock(&remote.channels).push(counterpart.clone());

            let announced: Arc<dyn DataChannel> = counterpart.clone();
            let announce = lock(&remote.on_data_channel)
                .as_mut()
                .map(|f| f(announced));
            match announce {
                Some(fut) => fut.await,
                None => warn!("Mock peer {} has no data channel handler", remote.id),
            }

            local.fire_open().await;
            counterpart.fire_open().await;
        }
    }
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    async fn create_offer(&self) -> Result<SessionDescription, EngineError> {
        self.ensure_open()?;
        Ok(SessionDescription::offer(format!("{OFFER_PREFIX}{}", self.id)))
    }

    async fn create_answer(&self) -> Result<SessionDescription, EngineError> {
        self.ensure_open()?;
        match lock(&self.remote).as_ref() {
            Some(desc) if desc.is_offer() => {}
            _ => {
                return Err(EngineError::Negotiation(
                    "cannot answer without a remote offer".to_owned(),
                ));
            }
        }
        Ok(SessionDescription::answer(format!("{ANSWER_PREFIX}{}", self.id)))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        self.ensure_open()?;
        *lock(&self.local) = Some(desc);
        self.set_state(PeerState::Connecting);
        self.emit_candidate().await;
        Ok(())
    }

    async fn local_description(&self) -> Result<Option<SessionDescription>, EngineError> {
        Ok(lock(&self.local).clone())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        self.ensure_open()?;
        let peer_id = self.parse_peer(&desc)?;
        let is_offer = desc.is_offer();
        if !is_offer && !lock(&self.local).as_ref().is_some_and(|d| d.is_offer()) {
            return Err(EngineError::Negotiation(
                "answer received without a local offer".to_owned(),
            ));
        }
        *lock(&self.remote) = Some(desc);

        if !is_offer {
            let remote = self.network.find(&peer_id).ok_or_else(|| {
                EngineError::Negotiation(format!("unknown mock peer {peer_id}"))
            })?;
            self.link(&remote).await;
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.ensure_open()?;
        if lock(&self.remote).is_none() {
            return Err(EngineError::Negotiation(
                "candidate received before remote description".to_owned(),
            ));
        }
        let valid = candidate
            .candidate
            .strip_prefix(CANDIDATE_PREFIX)
            .is_some_and(|id| Uuid::parse_str(id).is_ok());
        if !valid {
            return Err(EngineError::Negotiation(format!(
                "invalid candidate '{}'",
                candidate.candidate
            )));
        }
        lock(&self.remote_candidates).push(candidate);
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, EngineError> {
        self.ensure_open()?;
        let channel = MockDataChannel::detached(label);
        lock(&self.channels).push(channel.clone());
        Ok(channel)
    }

    fn on_data_channel(&self, f: OnDataChannelHdlrFn) {
        *lock(&self.on_data_channel) = Some(f);
    }

    fn on_ice_candidate(&self, f: OnIceCandidateHdlrFn) {
        *lock(&self.on_ice_candidate) = Some(f);
    }

    fn connection_state(&self) -> PeerState {
        *lock(&self.state)
    }

    async fn close(&self) -> Result<(), EngineError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("Closing mock peer {}", self.id);
        self.set_state(PeerState::Closed);

        for channel in self.channels() {
            channel.fire_close().await;
            if let Some(remote) = channel.remote() {
                remote.fire_close().await;
            }
        }
        Ok(())
    }
}

pub struct MockDataChannel {
    label: String,
    open: AtomicBool,
    closed: AtomicBool,
    remote: OnceLock<Weak<MockDataChannel>>,
    sent: Mutex<Vec<Frame>>,
    inbox_tx: mpsc::UnboundedSender<Bytes>,
    inbox_rx: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
    on_open: Mutex<Option<OnOpenHdlrFn>>,
    on_close: Mutex<Option<OnCloseHdlrFn>>,
}

impl MockDataChannel {
    /// A channel with no remote end. Frames sent on it are only recorded.
    pub fn detached(label: &str) -> Arc<Self> {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            label: label.to_owned(),
            open: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            remote: OnceLock::new(),
            sent: Mutex::new(Vec::new()),
            inbox_tx,
            inbox_rx: Mutex::new(Some(inbox_rx)),
            on_open: Mutex::new(None),
            on_close: Mutex::new(None),
        })
    }

    fn pair_with(&self, remote: &Arc<MockDataChannel>) {
        let _ = self.remote.set(Arc::downgrade(remote));
    }

    fn remote(&self) -> Option<Arc<MockDataChannel>> {
        self.remote.get().and_then(Weak::upgrade)
    }

    pub fn sent_frames(&self) -> Vec<Frame> {
        lock(&self.sent).clone()
    }

    /// Marks the channel open and runs the open handler once.
    pub async fn fire_open(&self) {
        if self.closed.load(Ordering::SeqCst) || self.open.swap(true, Ordering::SeqCst) {
            return;
        }
        let handler = lock(&self.on_open).take();
        if let Some(f) = handler {
            f().await;
        }
    }

    /// Marks the channel closed and runs the close handler once.
    pub async fn fire_close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.open.store(false, Ordering::SeqCst);
        let fut = lock(&self.on_close).as_mut().map(|f| f());
        if let Some(fut) = fut {
            fut.await;
        }
    }

    /// Queues a payload as if it had arrived from the remote.
    pub fn deliver(&self, data: Bytes) {
        let _ = self.inbox_tx.send(data);
    }
}

#[async_trait]
impl DataChannel for MockDataChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    async fn send(&self, frame: Frame) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::ChannelNotOpen);
        }
        let data = Bytes::copy_from_slice(frame.as_bytes());
        lock(&self.sent).push(frame);
        if let Some(remote) = self.remote() {
            remote.deliver(data);
        }
        Ok(())
    }

    fn on_open(&self, f: OnOpenHdlrFn) {
        *lock(&self.on_open) = Some(f);
        if self.is_open() {
            let handler = lock(&self.on_open).take();
            if let Some(f) = handler {
                tokio::spawn(f());
            }
        }
    }

    fn on_close(&self, f: OnCloseHdlrFn) {
        *lock(&self.on_close) = Some(f);
    }

    /// Payloads are handed to `f` one at a time, in arrival order.
    fn on_message(&self, mut f: OnMessageHdlrFn) {
        let Some(mut inbox) = lock(&self.inbox_rx).take() else {
            warn!("Message handler already installed on '{}'", self.label);
            return;
        };
        tokio::spawn(async move {
            while let Some(data) = inbox.recv().await {
                f(data).await;
            }
        });
    }
}
