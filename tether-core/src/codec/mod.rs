//! Message codecs.
//!
//! The bridge never looks inside protocol messages. It hands outbound
//! messages to a [`MessageCodec`] to get a [`Frame`] and hands inbound payloads
//! back to it to get either a message or a [`CodecError`].

mod json;

use crate::jsonrpc::JsonRpcMessage;
use crate::model::Frame;
use thiserror::Error;

pub use json::JsonCodec;

/// Codec used when none is supplied: JSON text frames carrying JSON-RPC 2.0.
pub type JsonRpcCodec = JsonCodec<JsonRpcMessage>;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not valid JSON.
    #[error("malformed payload: {0}")]
    Malformed(serde_json::Error),

    /// The message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(serde_json::Error),

    /// The payload is valid JSON but does not describe a message.
    #[error("invalid message: {0}")]
    Invalid(String),
}

pub trait MessageCodec: Send + Sync + 'static {
    type Message: Send + 'static;

    fn encode(&self, message: &Self::Message) -> Result<Frame, CodecError>;

    fn decode(&self, payload: &[u8]) -> Result<Self::Message, CodecError>;
}
