mod bridge;
mod entry_points;
mod state;

pub use bridge::*;
pub use entry_points::*;
pub use state::SessionState;
