use std::sync::Arc;
use tether_bridge::{BridgeError, BridgeParameters, SignalingError};

use crate::integration::init_tracing;
use crate::utils::{UnreachableSignaling, open_webrtc};

#[tokio::test]
async fn test_signaling_connect_failure() {
    init_tracing();

    for params in [BridgeParameters::server(), BridgeParameters::client()] {
        let result = open_webrtc(Arc::new(UnreachableSignaling), params).await;
        let error = result.err().expect("Open should fail");
        let cause = error
            .downcast_ref::<BridgeError>()
            .expect("Expected a bridge error");
        assert!(
            matches!(cause, BridgeError::Signaling(SignalingError::Transport(_))),
            "Unexpected error: {:?}",
            cause
        );
    }
}
