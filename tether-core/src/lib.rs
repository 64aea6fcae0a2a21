pub mod codec;
pub mod jsonrpc;
pub mod model;

pub use codec::{CodecError, JsonCodec, JsonRpcCodec, MessageCodec};
pub use jsonrpc::JsonRpcMessage;
pub use model::*;
