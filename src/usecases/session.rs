//! One user's capture-and-analyze session: both controllers, the input
//! aggregate and the shared submission service behind a single facade.

use crate::domain::{AnalysisPayload, AudioArtifact, DomainError, ImageArtifact, PresentationState};
use crate::usecases::audio_capture::{AudioCaptureController, AudioState};
use crate::usecases::inputs::InputAggregate;
use crate::usecases::submission::SubmissionService;
use crate::usecases::video_capture::{VideoCaptureController, VideoState};
use std::sync::Arc;
use tracing::debug;

pub struct AnalysisSession {
    video: VideoCaptureController,
    audio: AudioCaptureController,
    inputs: InputAggregate,
    submission: Arc<SubmissionService>,
}

impl AnalysisSession {
    pub fn new(
        video: VideoCaptureController,
        audio: AudioCaptureController,
        submission: Arc<SubmissionService>,
    ) -> Self {
        Self {
            video,
            audio,
            inputs: InputAggregate::new(),
            submission,
        }
    }

    pub fn inputs(&self) -> &InputAggregate {
        &self.inputs
    }

    pub fn video_state(&self) -> VideoState {
        self.video.state()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio.state()
    }

    pub fn recording_secs(&self) -> u64 {
        self.audio.elapsed_secs()
    }

    pub fn presentation(&self) -> PresentationState {
        self.submission.snapshot()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.inputs.set_text(text);
    }

    pub async fn open_camera(&mut self) -> Result<(), DomainError> {
        self.video.start().await
    }

    /// Capture a still from the live camera and make it the current photo.
    pub async fn capture_photo(&mut self) -> Result<(), DomainError> {
        let photo = self.video.capture().await?;
        self.inputs.set_image(Some(photo));
        Ok(())
    }

    pub fn cancel_camera(&mut self) {
        self.video.cancel();
    }

    /// Use a photo chosen from disk instead of the camera.
    pub fn use_photo(&mut self, photo: ImageArtifact) {
        debug!(file = %photo.file_name, bytes = photo.bytes.len(), "photo selected");
        self.inputs.set_image(Some(photo));
    }

    pub async fn start_recording(&mut self) -> Result<(), DomainError> {
        self.audio.start().await
    }

    /// Stop recording; the new clip replaces any previous one.
    pub async fn stop_recording(&mut self) -> Result<(), DomainError> {
        if let Some(clip) = self.audio.stop().await? {
            self.inputs.set_audio(Some(clip));
        }
        Ok(())
    }

    /// Use a voice clip chosen from disk instead of a recording.
    pub fn use_clip(&mut self, clip: AudioArtifact) {
        debug!(file = %clip.file_name, bytes = clip.bytes.len(), "voice clip selected");
        self.inputs.set_audio(Some(clip));
    }

    /// Takes `&mut self`: device streams are `Send` but not `Sync`.
    pub async fn analyze(&mut self) -> Result<AnalysisPayload, DomainError> {
        self.submission.submit(&self.inputs).await
    }

    pub fn reset(&mut self) {
        self.inputs.reset(&mut self.video);
    }

    /// Release camera and microphone. An unfinished recording is discarded.
    pub async fn release_devices(&mut self) {
        self.video.cancel();
        if let Err(e) = self.audio.stop().await {
            debug!(error = %e, "recording dropped on release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::testing::{MockCamera, MockMicrophone, ScriptedAnalysis, sample_payload};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_full_session_flow() {
        let camera = Arc::new(MockCamera::granting());
        let mic = Arc::new(MockMicrophone::granting(vec![vec![1, 2, 3]]));
        let analysis = Arc::new(ScriptedAnalysis::ok(sample_payload()));
        let mut session = AnalysisSession::new(
            VideoCaptureController::new(camera.clone(), Duration::ZERO, 85),
            AudioCaptureController::new(mic.clone()),
            Arc::new(SubmissionService::new(analysis.clone())),
        );

        session.set_text("I feel great");
        session.open_camera().await.unwrap();
        session.capture_photo().await.unwrap();
        session.start_recording().await.unwrap();
        session.stop_recording().await.unwrap();
        assert!(session.inputs().is_ready());

        let payload = session.analyze().await.unwrap();
        assert_eq!(payload, sample_payload());
        assert_eq!(analysis.call_count(), 1);
        assert_eq!(camera.open_handles.load(Ordering::SeqCst), 0);
        assert_eq!(mic.open_handles.load(Ordering::SeqCst), 0);

        session.reset();
        assert!(!session.inputs().is_ready());
        assert_eq!(session.video_state(), VideoState::Idle);
    }

    #[tokio::test]
    async fn test_missing_text_makes_no_call() {
        let analysis = Arc::new(ScriptedAnalysis::ok(sample_payload()));
        let mut session = AnalysisSession::new(
            VideoCaptureController::new(Arc::new(MockCamera::granting()), Duration::ZERO, 85),
            AudioCaptureController::new(Arc::new(MockMicrophone::granting(vec![vec![1]]))),
            Arc::new(SubmissionService::new(analysis.clone())),
        );
        session.open_camera().await.unwrap();
        session.capture_photo().await.unwrap();
        session.start_recording().await.unwrap();
        session.stop_recording().await.unwrap();

        assert_eq!(session.analyze().await, Err(DomainError::MissingText));
        assert_eq!(analysis.call_count(), 0);
        assert_eq!(
            session.presentation().error.as_deref(),
            Some("Please describe how you are feeling")
        );
    }

    #[tokio::test]
    async fn test_release_devices_frees_open_handles() {
        let camera = Arc::new(MockCamera::granting());
        let mic = Arc::new(MockMicrophone::granting(vec![vec![1]]));
        let mut session = AnalysisSession::new(
            VideoCaptureController::new(camera.clone(), Duration::ZERO, 85),
            AudioCaptureController::new(mic.clone()),
            Arc::new(SubmissionService::new(Arc::new(ScriptedAnalysis::ok(
                sample_payload(),
            )))),
        );
        session.open_camera().await.unwrap();
        session.start_recording().await.unwrap();

        session.release_devices().await;
        assert_eq!(camera.open_handles.load(Ordering::SeqCst), 0);
        assert_eq!(mic.open_handles.load(Ordering::SeqCst), 0);
        assert_eq!(session.video_state(), VideoState::Idle);
        assert_eq!(session.audio_state(), AudioState::Idle);
    }
}
