mod gate;
mod inbound;
mod outbound;

pub use gate::*;
pub use inbound::*;
pub use outbound::*;
