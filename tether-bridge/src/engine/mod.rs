//! Interface to the real-time transport engine.
//!
//! The bridge only talks to the engine through [`PeerConnection`] and
//! [`DataChannel`]. [`rtc`] implements them over `webrtc-rs`; [`mock`] is an
//! in-process engine with deterministic negotiation for tests.

pub mod mock;
pub mod rtc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tether_core::{Frame, IceCandidate, SessionDescription};
use thiserror::Error;

pub use rtc::{RtcDataChannel, RtcPeerConnection};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rtc(#[from] webrtc::Error),

    /// The engine rejected a description or candidate.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("data channel is not open")]
    ChannelNotOpen,

    #[error("peer connection is closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

pub type OnDataChannelHdlrFn =
    Box<dyn FnMut(Arc<dyn DataChannel>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Called with `None` once gathering has finished.
pub type OnIceCandidateHdlrFn =
    Box<dyn FnMut(Option<IceCandidate>) -> BoxFuture<'static, ()> + Send + Sync>;

pub type OnOpenHdlrFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + Sync>;

pub type OnCloseHdlrFn = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send + Sync>;

pub type OnMessageHdlrFn = Box<dyn FnMut(Bytes) -> BoxFuture<'static, ()> + Send + Sync>;

#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, EngineError>;

    async fn create_answer(&self) -> Result<SessionDescription, EngineError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    /// The current local description, if one has been set.
    async fn local_description(&self) -> Result<Option<SessionDescription>, EngineError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, EngineError>;

    /// Registers the handler for channels opened by the remote peer.
    fn on_data_channel(&self, f: OnDataChannelHdlrFn);

    /// Registers the handler for locally gathered ICE candidates.
    fn on_ice_candidate(&self, f: OnIceCandidateHdlrFn);

    fn connection_state(&self) -> PeerState;

    async fn close(&self) -> Result<(), EngineError>;
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn send(&self, frame: Frame) -> Result<(), EngineError>;

    /// Registering on a channel that is already open fires the handler.
    fn on_open(&self, f: OnOpenHdlrFn);

    fn on_close(&self, f: OnCloseHdlrFn);

    fn on_message(&self, f: OnMessageHdlrFn);
}
