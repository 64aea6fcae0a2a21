pub mod failing_signaling;
pub mod recording_signaling;
pub mod session_helpers;

pub use failing_signaling::*;
pub use recording_signaling::*;
pub use session_helpers::*;
