use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for the data channel when none is configured.
pub const DEFAULT_CHANNEL_NAME: &str = "mcp";

/// Which side of the offer/answer exchange a session plays.
///
/// The initiator creates the data channel and sends the offer. The responder
/// waits for the offer and for the remote to open the data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Initiator,
    Responder,
}

impl SessionRole {
    pub fn is_initiator(self) -> bool {
        matches!(self, Self::Initiator)
    }
}

impl Default for SessionRole {
    fn default() -> Self {
        Self::Responder
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "initiator"),
            Self::Responder => write!(f, "responder"),
        }
    }
}
