pub use tether_core::{JsonRpcMessage, SessionId, SessionRole};

pub mod model {
    pub use tether_core::model::*;
}

pub mod codec {
    pub use tether_core::codec::*;
}

pub mod jsonrpc {
    pub use tether_core::jsonrpc::*;
}

#[cfg(feature = "bridge")]
pub mod bridge {
    pub use tether_bridge::*;
}
