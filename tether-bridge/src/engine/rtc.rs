use crate::engine::{
    DataChannel, EngineError, OnCloseHdlrFn, OnDataChannelHdlrFn, OnIceCandidateHdlrFn,
    OnMessageHdlrFn, OnOpenHdlrFn, PeerConnection, PeerState,
};
use crate::transport::TransportConfig;
use async_trait::async_trait;
use futures::FutureExt;
use std::sync::Arc;
use tether_core::{Frame, IceCandidate, SdpKind, SessionDescription};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// [`PeerConnection`] backed by a `webrtc-rs` peer connection.
pub struct RtcPeerConnection {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerConnection {
    pub async fn new(config: &TransportConfig) -> Result<Self, EngineError> {
        // Codecs are registered even though only data channels are used.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                })
            },
        ));

        Ok(Self { peer_connection })
    }

    /// The underlying `webrtc-rs` connection.
    pub fn inner(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, EngineError> {
    let desc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(desc)
}

fn from_rtc_description(desc: RTCSessionDescription) -> Result<SessionDescription, EngineError> {
    match desc.sdp_type {
        RTCSdpType::Offer => Ok(SessionDescription::offer(desc.sdp)),
        RTCSdpType::Answer => Ok(SessionDescription::answer(desc.sdp)),
        other => Err(EngineError::Negotiation(format!(
            "unsupported description type '{other}'"
        ))),
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
    }
}

fn to_rtc_candidate(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: None,
    }
}

#[async_trait]
impl PeerConnection for RtcPeerConnection {
    async fn create_offer(&self) -> Result<SessionDescription, EngineError> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription, EngineError> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        let desc = to_rtc_description(desc)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn local_description(&self) -> Result<Option<SessionDescription>, EngineError> {
        self.peer_connection
            .local_description()
            .await
            .map(from_rtc_description)
            .transpose()
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        let desc = to_rtc_description(desc)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.peer_connection
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await?;
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>, EngineError> {
        let channel = self.peer_connection.create_data_channel(label, None).await?;
        debug!("Created data channel '{}'", label);
        Ok(Arc::new(RtcDataChannel::new(channel)))
    }

    fn on_data_channel(&self, mut f: OnDataChannelHdlrFn) {
        self.peer_connection
            .on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
                debug!("Remote opened data channel '{}'", channel.label());
                let channel: Arc<dyn DataChannel> = Arc::new(RtcDataChannel::new(channel));
                f(channel)
            }));
    }

    fn on_ice_candidate(&self, mut f: OnIceCandidateHdlrFn) {
        self.peer_connection
            .on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
                let candidate = match c.map(|c| c.to_json()).transpose() {
                    Ok(candidate) => candidate.map(from_rtc_candidate),
                    Err(e) => {
                        warn!("Failed to serialize local ICE candidate: {}", e);
                        return async {}.boxed();
                    }
                };
                f(candidate)
            }));
    }

    fn connection_state(&self) -> PeerState {
        match self.peer_connection.connection_state() {
            RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => PeerState::New,
            RTCPeerConnectionState::Connecting => PeerState::Connecting,
            RTCPeerConnectionState::Connected => PeerState::Connected,
            RTCPeerConnectionState::Disconnected => PeerState::Disconnected,
            RTCPeerConnectionState::Failed => PeerState::Failed,
            RTCPeerConnectionState::Closed => PeerState::Closed,
        }
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// [`DataChannel`] backed by a `webrtc-rs` data channel.
pub struct RtcDataChannel {
    channel: Arc<RTCDataChannel>,
}

impl RtcDataChannel {
    pub fn new(channel: Arc<RTCDataChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl DataChannel for RtcDataChannel {
    fn label(&self) -> &str {
        self.channel.label()
    }

    fn is_open(&self) -> bool {
        self.channel.ready_state() == RTCDataChannelState::Open
    }

    async fn send(&self, frame: Frame) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::ChannelNotOpen);
        }
        match frame {
            Frame::Text(text) => self.channel.send_text(text).await?,
            Frame::Binary(data) => self.channel.send(&data).await?,
        };
        Ok(())
    }

    fn on_open(&self, f: OnOpenHdlrFn) {
        self.channel.on_open(f);
    }

    fn on_close(&self, f: OnCloseHdlrFn) {
        self.channel.on_close(f);
    }

    fn on_message(&self, mut f: OnMessageHdlrFn) {
        self.channel
            .on_message(Box::new(move |msg: DataChannelMessage| f(msg.data)));
    }
}
