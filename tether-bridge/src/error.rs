use crate::engine::EngineError;
use crate::signaling::SignalingError;
use tether_core::CodecError;
use thiserror::Error;

/// Returned by a stream handle once the stream has been closed from either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message stream closed")]
pub struct StreamClosed;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("signaling failed: {0}")]
    Signaling(#[from] SignalingError),

    #[error("peer connection failed: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    StreamClosed(#[from] StreamClosed),

    #[error("background task panicked: {0}")]
    TaskPanicked(String),
}
