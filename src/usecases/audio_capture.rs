//! Microphone lifecycle: acquire -> record (elapsed ticker) -> stop -> artifact.

use crate::domain::{AudioArtifact, DomainError};
use crate::ports::{AudioStream, MicrophonePort};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Elapsed counter resolution.
const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Idle,
    Requesting,
    Recording,
}

/// Audio capture controller. One per session.
pub struct AudioCaptureController {
    microphone: Arc<dyn MicrophonePort>,
    stream: Option<Box<dyn AudioStream>>,
    state: AudioState,
    elapsed_secs: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
}

impl AudioCaptureController {
    pub fn new(microphone: Arc<dyn MicrophonePort>) -> Self {
        Self {
            microphone,
            stream: None,
            state: AudioState::Idle,
            elapsed_secs: Arc::new(AtomicU64::new(0)),
            ticker: None,
            started_at: None,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == AudioState::Recording
    }

    /// Whole seconds recorded so far. Zero when idle.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::Relaxed)
    }

    /// Start a new recording. A recording already in progress is discarded first.
    pub async fn start(&mut self) -> Result<(), DomainError> {
        if self.stream.is_some() {
            debug!("recording already in progress, discarding it");
            self.teardown();
        }

        self.state = AudioState::Requesting;
        let stream = match self.microphone.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "microphone acquisition failed");
                self.state = AudioState::Idle;
                return Err(e);
            }
        };

        self.stream = Some(stream);
        self.started_at = Some(Instant::now());
        self.elapsed_secs.store(0, Ordering::Relaxed);
        let elapsed = Arc::clone(&self.elapsed_secs);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                elapsed.fetch_add(1, Ordering::Relaxed);
            }
        }));
        self.state = AudioState::Recording;
        info!("recording started");
        Ok(())
    }

    /// Stop recording and build the artifact. No-op (`Ok(None)`) when not recording.
    pub async fn stop(&mut self) -> Result<Option<AudioArtifact>, DomainError> {
        if self.state != AudioState::Recording {
            return Ok(None);
        }
        let duration = self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or_default();
        let stream = self.stream.take();
        self.teardown();

        let Some(stream) = stream else {
            return Ok(None);
        };
        // Device is released when `finish` consumes the stream.
        let recorded = stream.finish().await?;
        let bytes = recorded.chunks.concat();
        if bytes.is_empty() {
            warn!("recording produced no audio");
            return Err(DomainError::EmptyRecording);
        }

        info!(
            bytes = bytes.len(),
            duration_ms = duration.as_millis() as u64,
            mime = %recorded.mime_type,
            "recording stopped"
        );
        Ok(Some(AudioArtifact {
            bytes,
            mime_type: recorded.mime_type,
            file_name: recorded.file_name,
            duration,
            recorded_at: chrono::Utc::now(),
        }))
    }

    /// Drop the stream (releasing the device), stop the ticker, reset the counter.
    fn teardown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.stream = None;
        self.started_at = None;
        self.elapsed_secs.store(0, Ordering::Relaxed);
        self.state = AudioState::Idle;
    }
}

impl Drop for AudioCaptureController {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
