//! Core domain layer. No device or network I/O.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod presentation;

pub use entities::{
    AnalysisPayload, AudioArtifact, DeviceKind, EmotionScore, ImageArtifact, MlPredictions,
    Modality, RawFrame, SubmissionResult,
};
pub use errors::DomainError;
pub use presentation::PresentationState;
