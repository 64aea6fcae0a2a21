mod candidates;
mod coordinator;
mod memory;
mod signaling_channel;

pub use candidates::*;
pub use coordinator::*;
pub use memory::*;
pub use signaling_channel::*;
