//! Camera backed by a frame file on disk.
//!
//! Any external grabber (v4l2 loopback snapshotter, `ffmpeg -update 1`, a phone
//! sync folder) keeps overwriting one image file; each `grab_frame` decodes the
//! latest version at its native resolution.

use crate::domain::{DeviceKind, DomainError, RawFrame};
use crate::ports::{CameraPort, VideoStream};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct FrameFileCamera {
    path: PathBuf,
}

impl FrameFileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CameraPort for FrameFileCamera {
    async fn acquire(&self) -> Result<Box<dyn VideoStream>, DomainError> {
        let exists = tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        if !exists {
            warn!(path = %self.path.display(), "camera frame source not found");
            return Err(DomainError::DeviceAccessDenied {
                device: DeviceKind::Camera,
            });
        }
        info!(path = %self.path.display(), "camera frame source opened");
        Ok(Box::new(FrameFileStream {
            path: self.path.clone(),
        }))
    }
}

struct FrameFileStream {
    path: PathBuf,
}

#[async_trait::async_trait]
impl VideoStream for FrameFileStream {
    async fn grab_frame(&mut self) -> Result<RawFrame, DomainError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DomainError::Device(format!("read {}: {}", self.path.display(), e)))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| DomainError::Device(format!("decode frame: {}", e)))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        debug!(width, height, "frame grabbed");
        Ok(RawFrame {
            width,
            height,
            rgba: decoded.into_raw(),
        })
    }
}

impl Drop for FrameFileStream {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "camera frame source closed");
    }
}
