//! Bridges a WebRTC data channel to a pair of message streams.
//!
//! [`BridgeSession::open`] drives signaling over a [`Signaling`] channel,
//! negotiates a single data channel through a [`PeerConnection`], and hands
//! the protocol layer an [`InboundStream`] and an [`OutboundStream`].

pub mod engine;
mod error;
pub mod relay;
mod session;
pub mod signaling;
pub mod stream;
pub mod transport;

pub use engine::{DataChannel, EngineError, PeerConnection, PeerState, RtcPeerConnection};
pub use error::*;
pub use session::*;
pub use signaling::{MemorySignaling, Signaling, SignalingError};
pub use stream::{InboundStream, OutboundStream};
pub use transport::{BridgeParameters, TransportConfig};
