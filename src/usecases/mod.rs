//! Application use cases. Orchestrate domain logic via ports.

pub mod audio_capture;
pub mod inputs;
pub mod session;
pub mod submission;
pub mod video_capture;

#[cfg(test)]
pub(crate) mod testing;

pub use audio_capture::{AudioCaptureController, AudioState};
pub use inputs::InputAggregate;
pub use session::AnalysisSession;
pub use submission::SubmissionService;
pub use video_capture::{VideoCaptureController, VideoState};
