//! In-crate mock ports with counters for device handles and network calls.

use crate::domain::{
    AnalysisPayload, AudioArtifact, DeviceKind, DomainError, EmotionScore, ImageArtifact,
    MlPredictions, RawFrame,
};
use crate::ports::{
    AnalysisPort, AnalysisRequest, AudioStream, CameraPort, MicrophonePort, RecordedAudio,
    VideoStream,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Decrements the shared counter when the handle is dropped.
struct HandleGuard(Arc<AtomicUsize>);

impl HandleGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockCamera {
    grant: bool,
    pub open_handles: Arc<AtomicUsize>,
    pub acquisitions: AtomicUsize,
}

impl MockCamera {
    pub fn granting() -> Self {
        Self {
            grant: true,
            open_handles: Arc::new(AtomicUsize::new(0)),
            acquisitions: AtomicUsize::new(0),
        }
    }

    pub fn denying() -> Self {
        Self {
            grant: false,
            ..Self::granting()
        }
    }
}

struct MockVideoStream {
    _guard: HandleGuard,
}

#[async_trait::async_trait]
impl CameraPort for MockCamera {
    async fn acquire(&self) -> Result<Box<dyn VideoStream>, DomainError> {
        if !self.grant {
            return Err(DomainError::DeviceAccessDenied {
                device: DeviceKind::Camera,
            });
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockVideoStream {
            _guard: HandleGuard::open(&self.open_handles),
        }))
    }
}

#[async_trait::async_trait]
impl VideoStream for MockVideoStream {
    async fn grab_frame(&mut self) -> Result<RawFrame, DomainError> {
        let (width, height) = (8u32, 6u32);
        let rgba = (0..width * height)
            .flat_map(|i| [(i * 5) as u8, 120, 200, 255])
            .collect();
        Ok(RawFrame {
            width,
            height,
            rgba,
        })
    }
}

pub struct MockMicrophone {
    grant: bool,
    chunks: Vec<Vec<u8>>,
    pub open_handles: Arc<AtomicUsize>,
}

impl MockMicrophone {
    pub fn granting(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            grant: true,
            chunks,
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denying() -> Self {
        Self {
            grant: false,
            ..Self::granting(Vec::new())
        }
    }
}

struct MockAudioStream {
    chunks: Vec<Vec<u8>>,
    _guard: HandleGuard,
}

#[async_trait::async_trait]
impl MicrophonePort for MockMicrophone {
    async fn acquire(&self) -> Result<Box<dyn AudioStream>, DomainError> {
        if !self.grant {
            return Err(DomainError::DeviceAccessDenied {
                device: DeviceKind::Microphone,
            });
        }
        Ok(Box::new(MockAudioStream {
            chunks: self.chunks.clone(),
            _guard: HandleGuard::open(&self.open_handles),
        }))
    }
}

#[async_trait::async_trait]
impl AudioStream for MockAudioStream {
    async fn finish(self: Box<Self>) -> Result<RecordedAudio, DomainError> {
        Ok(RecordedAudio {
            chunks: self.chunks.clone(),
            mime_type: "audio/webm".into(),
            file_name: "recording.webm".into(),
        })
    }
}

/// Scripted analysis service. Counts calls and sleeps `delay` before answering.
pub struct ScriptedAnalysis {
    outcome: Result<AnalysisPayload, DomainError>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedAnalysis {
    pub fn ok(payload: AnalysisPayload) -> Self {
        Self {
            outcome: Ok(payload),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(DomainError::AnalysisFailed(reason.to_string())),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AnalysisPort for ScriptedAnalysis {
    async fn analyze(&self, _request: AnalysisRequest<'_>) -> Result<AnalysisPayload, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }

    async fn health(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

pub fn sample_payload() -> AnalysisPayload {
    AnalysisPayload {
        text: EmotionScore {
            label: "joy".into(),
            score: 0.92,
        },
        image: EmotionScore {
            label: "happy".into(),
            score: 0.87,
        },
        audio: EmotionScore {
            label: "joy".into(),
            score: 0.78,
        },
        chart: None,
        ml_predictions: MlPredictions {
            decision_tree: "joy".into(),
            knn: "happy".into(),
        },
        total_records: 42,
        timestamp: None,
        success: None,
    }
}

pub fn sample_image() -> ImageArtifact {
    ImageArtifact::new(vec![0xff, 0xd8, 0xff, 0xe0], "image/jpeg", "photo.jpg")
}

pub fn sample_audio() -> AudioArtifact {
    AudioArtifact {
        bytes: vec![0x1a, 0x45, 0xdf, 0xa3],
        mime_type: "audio/webm".into(),
        file_name: "recording.webm".into(),
        duration: Duration::from_secs(3),
        recorded_at: chrono::Utc::now(),
    }
}
