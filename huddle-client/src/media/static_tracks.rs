use crate::error::ClientError;
use crate::media::LocalMedia;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// [`LocalMedia`] fed by whatever produces encoded samples (a file reader, a
/// capture pipeline, a test pattern).
///
/// Producers should watch [`stopped`](Self::stopped) and exit once it flips.
/// Stopping is final: the tracks cannot be started again.
pub struct StaticTracks {
    audio: Arc<TrackLocalStaticSample>,
    video: Arc<TrackLocalStaticSample>,
    audio_enabled: AtomicBool,
    video_enabled: AtomicBool,
    started: AtomicBool,
    stop_tx: watch::Sender<bool>,
}

impl StaticTracks {
    pub fn new(stream_id: &str) -> Self {
        let audio = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            "audio".to_owned(),
            stream_id.to_owned(),
        ));
        let video = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            stream_id.to_owned(),
        ));
        let (stop_tx, _) = watch::channel(false);

        Self {
            audio,
            video,
            audio_enabled: AtomicBool::new(true),
            video_enabled: AtomicBool::new(true),
            started: AtomicBool::new(false),
            stop_tx,
        }
    }

    pub fn stopped(&self) -> watch::Receiver<bool> {
        self.stop_tx.subscribe()
    }

    pub fn is_live(&self) -> bool {
        self.started.load(Ordering::Acquire) && !*self.stop_tx.borrow()
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled.load(Ordering::Relaxed)
    }

    pub fn video_enabled(&self) -> bool {
        self.video_enabled.load(Ordering::Relaxed)
    }

    /// Returns `false` when the sample was skipped (muted or not live).
    pub async fn write_audio(&self, data: Bytes, duration: Duration) -> Result<bool> {
        if !self.is_live() || !self.audio_enabled() {
            return Ok(false);
        }
        write(&self.audio, data, duration).await
    }

    /// Returns `false` when the sample was skipped (camera off or not live).
    pub async fn write_video(&self, data: Bytes, duration: Duration) -> Result<bool> {
        if !self.is_live() || !self.video_enabled() {
            return Ok(false);
        }
        write(&self.video, data, duration).await
    }
}

async fn write(track: &TrackLocalStaticSample, data: Bytes, duration: Duration) -> Result<bool> {
    track
        .write_sample(&Sample {
            data,
            duration,
            ..Default::default()
        })
        .await?;
    Ok(true)
}

#[async_trait]
impl LocalMedia for StaticTracks {
    async fn start(&self) -> Result<(), ClientError> {
        if *self.stop_tx.borrow() {
            return Err(ClientError::MediaAcquisitionFailed(
                "tracks were already released".to_owned(),
            ));
        }
        if !self.started.swap(true, Ordering::AcqRel) {
            info!("Local media started");
        }
        Ok(())
    }

    async fn stop(&self) {
        if !self.stop_tx.send_replace(true) {
            info!("Local media stopped");
        }
    }

    fn set_audio_enabled(&self, enabled: bool) {
        debug!("Microphone {}", if enabled { "on" } else { "muted" });
        self.audio_enabled.store(enabled, Ordering::Relaxed);
    }

    fn set_video_enabled(&self, enabled: bool) {
        debug!("Camera {}", if enabled { "on" } else { "off" });
        self.video_enabled.store(enabled, Ordering::Relaxed);
    }

    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        vec![
            self.audio.clone() as Arc<dyn TrackLocal + Send + Sync>,
            self.video.clone() as Arc<dyn TrackLocal + Send + Sync>,
        ]
    }
}
