//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Display strings are user-facing.

use super::entities::DeviceKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{device} access denied")]
    DeviceAccessDenied { device: DeviceKind },

    #[error("Please describe how you are feeling")]
    MissingText,

    #[error("Please capture or upload a photo")]
    MissingImage,

    #[error("Please record a voice clip")]
    MissingAudio,

    /// Any failure from the remote service: status, transport, timeout or body.
    #[error("Error analyzing emotions. Make sure the backend is running. ({0})")]
    AnalysisFailed(String),

    /// Operation invoked in a state that does not support it. Not user-facing.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("An analysis is already in progress")]
    SubmissionInFlight,

    #[error("Recording is empty, please try again")]
    EmptyRecording,

    #[error("Unsupported file: {0}")]
    UnsupportedMedia(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("UI error: {0}")]
    Ui(String),
}

impl DomainError {
    /// True for errors the UI should not show (logged and ignored).
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidState(_) | DomainError::SubmissionInFlight
        )
    }
}
