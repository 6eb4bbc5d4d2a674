//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters. Device handles are RAII: dropping a stream
//! releases the underlying camera or microphone.

use crate::domain::{AnalysisPayload, AudioArtifact, DomainError, ImageArtifact, RawFrame};

/// Camera device class. At most one stream is open per controller.
#[async_trait::async_trait]
pub trait CameraPort: Send + Sync {
    /// Request exclusive access to the camera.
    ///
    /// Returns `DomainError::DeviceAccessDenied` when the platform refuses.
    async fn acquire(&self) -> Result<Box<dyn VideoStream>, DomainError>;
}

/// Live camera stream. Held only while the controller is `Requesting` or `Live`.
#[async_trait::async_trait]
pub trait VideoStream: Send {
    /// Current frame at the device's native resolution.
    async fn grab_frame(&mut self) -> Result<RawFrame, DomainError>;
}

/// Microphone device class.
#[async_trait::async_trait]
pub trait MicrophonePort: Send + Sync {
    /// Request exclusive access and start buffering audio.
    async fn acquire(&self) -> Result<Box<dyn AudioStream>, DomainError>;
}

/// Buffered audio handed back when a recording stops.
#[derive(Debug, Default)]
pub struct RecordedAudio {
    /// Encoded chunks in arrival order. Concatenation is the full clip.
    pub chunks: Vec<Vec<u8>>,
    pub mime_type: String,
    pub file_name: String,
}

/// Live microphone stream.
#[async_trait::async_trait]
pub trait AudioStream: Send {
    /// Stop recording, flush the final chunk and hand back everything buffered.
    /// The device is released when the stream is dropped.
    async fn finish(self: Box<Self>) -> Result<RecordedAudio, DomainError>;
}

/// The three inputs, borrowed read-only for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub text: &'a str,
    pub image: &'a ImageArtifact,
    pub audio: &'a AudioArtifact,
}

/// Remote multimodal emotion analysis service.
#[async_trait::async_trait]
pub trait AnalysisPort: Send + Sync {
    /// Submit the inputs. Any failure maps to `DomainError::AnalysisFailed`.
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisPayload, DomainError>;

    /// Liveness check. Used once at startup.
    async fn health(&self) -> Result<(), DomainError>;
}
