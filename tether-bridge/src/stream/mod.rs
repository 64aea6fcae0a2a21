mod message_stream;
pub mod rendezvous;

pub use message_stream::*;
