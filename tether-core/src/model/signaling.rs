use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// An SDP offer or answer as exchanged over signaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }

    pub fn is_offer(&self) -> bool {
        self.kind == SdpKind::Offer
    }
}

/// A trickled ICE candidate in the browser `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

/// Messages carried by the signaling channel, in the order they must be applied.
///
/// `Bye` is the terminal sentinel: the sender is done negotiating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub enum SignalMessage {
    SessionDescription(SessionDescription),
    IceCandidate(IceCandidate),
    Bye,
}

impl From<SessionDescription> for SignalMessage {
    fn from(desc: SessionDescription) -> Self {
        Self::SessionDescription(desc)
    }
}

impl From<IceCandidate> for SignalMessage {
    fn from(candidate: IceCandidate) -> Self {
        Self::IceCandidate(candidate)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: String,
        #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
        sdp_mid: Option<String>,
        #[serde(
            rename = "sdpMLineIndex",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        sdp_m_line_index: Option<u16>,
    },
    Bye,
}

impl From<WireMessage> for SignalMessage {
    fn from(wire: WireMessage) -> Self {
        match wire {
            WireMessage::Offer { sdp } => Self::SessionDescription(SessionDescription::offer(sdp)),
            WireMessage::Answer { sdp } => {
                Self::SessionDescription(SessionDescription::answer(sdp))
            }
            WireMessage::Candidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => Self::IceCandidate(IceCandidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            }),
            WireMessage::Bye => Self::Bye,
        }
    }
}

impl From<SignalMessage> for WireMessage {
    fn from(msg: SignalMessage) -> Self {
        match msg {
            SignalMessage::SessionDescription(SessionDescription { kind, sdp }) => match kind {
                SdpKind::Offer => Self::Offer { sdp },
                SdpKind::Answer => Self::Answer { sdp },
            },
            SignalMessage::IceCandidate(IceCandidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            }) => Self::Candidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            },
            SignalMessage::Bye => Self::Bye,
        }
    }
}
