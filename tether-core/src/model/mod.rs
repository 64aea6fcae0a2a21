mod frame;
mod role;
mod session;
mod signaling;

pub use frame::Frame;
pub use role::{DEFAULT_CHANNEL_NAME, SessionRole};
pub use session::SessionId;
pub use signaling::{IceCandidate, SdpKind, SessionDescription, SignalMessage};
