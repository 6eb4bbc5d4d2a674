//! Camera lifecycle: acquire -> settle -> live preview -> capture still -> release.
//!
//! The controller owns the only handle slot for the camera. Every exit from
//! `Live` (capture, cancel, stop, a new start) empties the slot, and dropping
//! the stream is what releases the device.

use crate::domain::{DomainError, ImageArtifact, RawFrame};
use crate::ports::{CameraPort, VideoStream};
use image::codecs::jpeg::JpegEncoder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CAPTURE_FILE_NAME: &str = "photo.jpg";
pub const CAPTURE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoState {
    Idle,
    Requesting,
    Live,
    Captured,
    Cancelled,
}

/// Video capture controller. One per session.
pub struct VideoCaptureController {
    camera: Arc<dyn CameraPort>,
    stream: Option<Box<dyn VideoStream>>,
    state: VideoState,
    /// Delay between grant and `Live` so the preview is rendering before it is shown.
    settle_delay: Duration,
    jpeg_quality: u8,
}

impl VideoCaptureController {
    pub fn new(camera: Arc<dyn CameraPort>, settle_delay: Duration, jpeg_quality: u8) -> Self {
        Self {
            camera,
            stream: None,
            state: VideoState::Idle,
            settle_delay,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn state(&self) -> VideoState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == VideoState::Live
    }

    /// Open the camera. An already-open stream is released first.
    ///
    /// On denial the controller is back in `Idle` and the error is returned for the UI.
    pub async fn start(&mut self) -> Result<(), DomainError> {
        if self.stream.is_some() {
            debug!(state = ?self.state, "camera already open, releasing before restart");
            self.stop();
        }

        self.state = VideoState::Requesting;
        let stream = match self.camera.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "camera acquisition failed");
                self.state = VideoState::Idle;
                return Err(e);
            }
        };
        self.stream = Some(stream);

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        self.state = VideoState::Live;
        info!(settle_ms = self.settle_delay.as_millis() as u64, "camera live");
        Ok(())
    }

    /// Grab the current frame, encode it as JPEG and release the camera.
    ///
    /// Outside `Live` this returns `InvalidState` and changes nothing.
    pub async fn capture(&mut self) -> Result<ImageArtifact, DomainError> {
        if self.state != VideoState::Live {
            return Err(DomainError::InvalidState(format!(
                "capture requested while camera is {:?}",
                self.state
            )));
        }
        let Some(stream) = self.stream.as_mut() else {
            self.state = VideoState::Idle;
            return Err(DomainError::InvalidState("live without a stream".into()));
        };

        let encoded = match stream.grab_frame().await {
            Ok(frame) => encode_jpeg(frame, self.jpeg_quality),
            Err(e) => Err(e),
        };
        let bytes = match encoded {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "frame capture failed, releasing camera");
                self.stop();
                return Err(e);
            }
        };

        self.state = VideoState::Captured;
        let artifact = ImageArtifact::new(bytes, CAPTURE_MIME_TYPE, CAPTURE_FILE_NAME);
        info!(bytes = artifact.bytes.len(), "photo captured");
        self.stop();
        Ok(artifact)
    }

    /// Abandon the preview (or a pending acquisition) and release the camera.
    pub fn cancel(&mut self) {
        if matches!(self.state, VideoState::Requesting | VideoState::Live) {
            self.state = VideoState::Cancelled;
            debug!("camera cancelled");
        }
        self.stop();
    }

    /// Release the camera. Idempotent.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("camera released");
        }
        self.state = VideoState::Idle;
    }
}

/// Encode a raw RGBA frame as baseline JPEG at the frame's own resolution.
pub fn encode_jpeg(frame: RawFrame, quality: u8) -> Result<Vec<u8>, DomainError> {
    let (width, height) = (frame.width, frame.height);
    let rgba = image::RgbaImage::from_raw(width, height, frame.rgba).ok_or_else(|| {
        DomainError::Encode(format!("frame buffer does not match {}x{}", width, height))
    })?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| DomainError::Encode(format!("jpeg: {}", e)))?;
    Ok(out)
}
