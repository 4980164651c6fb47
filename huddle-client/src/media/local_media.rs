use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Local camera and microphone capture.
///
/// Acquired once per call and released together with every peer link.
#[async_trait]
pub trait LocalMedia: Send + Sync {
    /// Fails with [`ClientError::MediaAcquisitionFailed`] when capture is unavailable.
    async fn start(&self) -> Result<(), ClientError>;

    async fn stop(&self);

    fn set_audio_enabled(&self, enabled: bool);

    fn set_video_enabled(&self, enabled: bool);

    /// Tracks to attach to every new peer transport.
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>>;
}
