//! Input aggregate: current text, photo and voice clip, plus derived readiness.

use crate::domain::{AudioArtifact, DomainError, ImageArtifact};
use crate::usecases::video_capture::VideoCaptureController;

#[derive(Debug, Clone, Default)]
pub struct InputAggregate {
    text: String,
    image: Option<ImageArtifact>,
    audio: Option<AudioArtifact>,
}

impl InputAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_image(&mut self, image: Option<ImageArtifact>) {
        self.image = image;
    }

    /// Replaces any previous clip (re-record).
    pub fn set_audio(&mut self, audio: Option<AudioArtifact>) {
        self.audio = audio;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageArtifact> {
        self.image.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioArtifact> {
        self.audio.as_ref()
    }

    /// First missing input, checked text -> image -> audio.
    pub fn missing(&self) -> Option<DomainError> {
        if self.text.trim().is_empty() {
            Some(DomainError::MissingText)
        } else if self.image.is_none() {
            Some(DomainError::MissingImage)
        } else if self.audio.is_none() {
            Some(DomainError::MissingAudio)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.missing().is_none()
    }

    /// Borrow all three inputs, or the first validation error.
    pub fn validated(&self) -> Result<(&str, &ImageArtifact, &AudioArtifact), DomainError> {
        match (&self.image, &self.audio) {
            (Some(image), Some(audio)) if !self.text.trim().is_empty() => {
                Ok((self.text.as_str(), image, audio))
            }
            _ => Err(self.missing().unwrap_or(DomainError::MissingText)),
        }
    }

    /// Clear every input and shut down a live camera.
    pub fn reset(&mut self, video: &mut VideoCaptureController) {
        *self = Self::default();
        video.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::testing::{MockCamera, sample_audio, sample_image};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[test]
    fn test_readiness_over_all_combinations() {
        let texts = ["", "   \n\t", "I feel great", "  ok  "];
        for text in texts {
            for with_image in [false, true] {
                for with_audio in [false, true] {
                    let mut inputs = InputAggregate::new();
                    inputs.set_text(text);
                    inputs.set_image(with_image.then(sample_image));
                    inputs.set_audio(with_audio.then(sample_audio));

                    let expected = !text.trim().is_empty() && with_image && with_audio;
                    assert_eq!(inputs.is_ready(), expected, "text={text:?} image={with_image} audio={with_audio}");
                    assert_eq!(inputs.validated().is_ok(), expected);
                }
            }
        }
    }

    #[test]
    fn test_missing_follows_text_image_audio_order() {
        let mut inputs = InputAggregate::new();
        inputs.set_audio(Some(sample_audio()));
        assert_eq!(inputs.missing(), Some(DomainError::MissingText));

        inputs.set_text("calm");
        assert_eq!(inputs.missing(), Some(DomainError::MissingImage));

        inputs.set_image(Some(sample_image()));
        inputs.set_audio(None);
        assert_eq!(inputs.missing(), Some(DomainError::MissingAudio));
    }

    #[tokio::test]
    async fn test_reset_clears_inputs_and_cancels_camera() {
        let camera = Arc::new(MockCamera::granting());
        let mut video = VideoCaptureController::new(camera.clone(), Duration::ZERO, 85);
        video.start().await.unwrap();

        let mut inputs = InputAggregate::new();
        inputs.set_text("tired");
        inputs.set_image(Some(sample_image()));
        inputs.set_audio(Some(sample_audio()));

        inputs.reset(&mut video);
        assert_eq!(inputs.text(), "");
        assert!(inputs.image().is_none());
        assert!(inputs.audio().is_none());
        assert!(!video.is_live());
        assert_eq!(camera.open_handles.load(Ordering::SeqCst), 0);
    }
}
