//! Domain entities. Pure data structures for the core business.
//!
//! No device/HTTP types here; adapters map into these.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::DomainError;

/// Input modality. Used for device naming and per-part bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Audio,
}

/// Exclusive capture device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Camera => write!(f, "Camera"),
            DeviceKind::Microphone => write!(f, "Microphone"),
        }
    }
}

/// One uncompressed frame at the device's native resolution (RGBA8, row-major).
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Still image ready for submission. Produced by camera capture or file selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    /// `data:` URL the renderer can show directly.
    pub preview: String,
    pub captured_at: DateTime<Utc>,
}

impl ImageArtifact {
    /// Build from already-encoded bytes.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let preview = data_url(&mime_type, &bytes);
        Self {
            bytes,
            mime_type,
            file_name: file_name.into(),
            preview,
            captured_at: Utc::now(),
        }
    }

    /// Build from a user-selected file. The extension must name an image type
    /// and the bytes must actually be one; the MIME type follows the content.
    pub fn from_upload(bytes: Vec<u8>, path: &Path) -> Result<Self, DomainError> {
        let file_name = upload_file_name(path);
        if image_mime_for_path(path).is_none() {
            return Err(DomainError::UnsupportedMedia(file_name));
        }
        if bytes.is_empty() {
            return Err(DomainError::UnsupportedMedia(format!("{} is empty", file_name)));
        }
        let format = image::guess_format(&bytes).map_err(|_| {
            DomainError::UnsupportedMedia(format!("{} is not a readable image", file_name))
        })?;
        Ok(Self::new(bytes, format.to_mime_type(), file_name))
    }
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// Recorded voice clip ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub duration: Duration,
    pub recorded_at: DateTime<Utc>,
}

impl AudioArtifact {
    /// Build from a user-selected audio file. `duration` is zero when unknown.
    pub fn from_upload(bytes: Vec<u8>, path: &Path, duration: Duration) -> Result<Self, DomainError> {
        let file_name = upload_file_name(path);
        let mime = audio_mime_for_path(path)
            .ok_or_else(|| DomainError::UnsupportedMedia(file_name.clone()))?;
        if bytes.is_empty() {
            return Err(DomainError::UnsupportedMedia(format!("{} is empty", file_name)));
        }
        Ok(Self {
            bytes,
            mime_type: mime.to_string(),
            file_name,
            duration,
            recorded_at: Utc::now(),
        })
    }
}

/// Returns the MIME type for an image file extension, or None if it is not an image.
pub fn image_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Returns the MIME type for an audio file extension, or None if it is not audio.
pub fn audio_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        "ogg" | "oga" => Some("audio/ogg"),
        "webm" => Some("audio/webm"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}

fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Top label and confidence for one modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

impl EmotionScore {
    /// Score as a percentage with one decimal, e.g. `92.0%`.
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

/// Predictions from the service's classical models. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPredictions {
    pub decision_tree: serde_json::Value,
    pub knn: serde_json::Value,
}

/// Successful analysis response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub text: EmotionScore,
    pub image: EmotionScore,
    pub audio: EmotionScore,
    /// Base64-encoded PNG bar chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    pub ml_predictions: MlPredictions,
    pub total_records: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl AnalysisPayload {
    /// Rejects payloads with scores outside [0, 1] or non-finite.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (modality, score) in [
            (Modality::Text, &self.text),
            (Modality::Image, &self.image),
            (Modality::Audio, &self.audio),
        ] {
            if !score.score.is_finite() || !(0.0..=1.0).contains(&score.score) {
                return Err(DomainError::AnalysisFailed(format!(
                    "{:?} score {} out of range",
                    modality, score.score
                )));
            }
        }
        Ok(())
    }

    /// Decoded chart PNG. `Ok(None)` when the service sent no chart.
    pub fn chart_png(&self) -> Result<Option<Vec<u8>>, DomainError> {
        let Some(chart) = self.chart.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        STANDARD
            .decode(chart)
            .map(Some)
            .map_err(|e| DomainError::Encode(format!("chart: {}", e)))
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Success(AnalysisPayload),
    Failure(String),
}
