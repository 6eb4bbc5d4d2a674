//! Photo and voice clip selection from disk.

use crate::domain::{AudioArtifact, DomainError, ImageArtifact};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Read an image file chosen by the user. Non-image extensions are rejected.
pub async fn load_photo(path: &Path) -> Result<ImageArtifact, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::UnsupportedMedia(format!("{}: {}", path.display(), e)))?;
    let photo = ImageArtifact::from_upload(bytes, path)?;
    info!(path = %path.display(), mime = %photo.mime_type, bytes = photo.bytes.len(), "photo loaded");
    Ok(photo)
}

/// Read a voice clip chosen by the user. WAV files must parse; their
/// duration comes from the header. Other formats carry a zero duration.
pub async fn load_clip(path: &Path) -> Result<AudioArtifact, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::UnsupportedMedia(format!("{}: {}", path.display(), e)))?;
    let duration = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
    {
        wav_duration(&bytes)
            .map_err(|e| DomainError::UnsupportedMedia(format!("{}: {}", path.display(), e)))?
    } else {
        Duration::ZERO
    };
    let clip = AudioArtifact::from_upload(bytes, path, duration)?;
    info!(
        path = %path.display(),
        mime = %clip.mime_type,
        bytes = clip.bytes.len(),
        duration_ms = clip.duration.as_millis() as u64,
        "voice clip loaded"
    );
    Ok(clip)
}

fn wav_duration(bytes: &[u8]) -> Result<Duration, hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let rate = reader.spec().sample_rate.max(1);
    Ok(Duration::from_secs_f64(
        f64::from(reader.duration()) / f64::from(rate),
    ))
}
