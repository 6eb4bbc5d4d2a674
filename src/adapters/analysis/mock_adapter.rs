//! Mock analysis adapter for running without the analysis service.
//!
//! Returns canned scores after a simulated network delay.

use crate::domain::{AnalysisPayload, DomainError, EmotionScore, MlPredictions};
use crate::ports::{AnalysisPort, AnalysisRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// The service only trains its classifiers once it has this many records.
const MIN_RECORDS_FOR_PREDICTIONS: u64 = 3;

/// Mock analysis adapter.
///
/// Keeps an in-memory record count so `total_records` grows across submissions.
pub struct MockAnalysisAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    records: AtomicU64,
}

impl MockAnalysisAdapter {
    /// Create a new mock adapter with default delay (300ms).
    pub fn new() -> Self {
        Self::with_delay(300)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            records: AtomicU64::new(0),
        }
    }
}

impl Default for MockAnalysisAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn score(label: &str, score: f64) -> EmotionScore {
    EmotionScore {
        label: label.to_string(),
        score,
    }
}

#[async_trait::async_trait]
impl AnalysisPort for MockAnalysisAdapter {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisPayload, DomainError> {
        info!(
            text_len = request.text.len(),
            image_bytes = request.image.bytes.len(),
            audio_bytes = request.audio.bytes.len(),
            "[MOCK] Simulating emotion analysis"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let total_records = self.records.fetch_add(1, Ordering::SeqCst) + 1;
        let prediction = if total_records >= MIN_RECORDS_FOR_PREDICTIONS {
            "Joy"
        } else {
            "N/A"
        };

        Ok(AnalysisPayload {
            text: score("Joy", 0.91),
            image: score("Happy", 0.84),
            audio: score("Neutral", 0.52),
            chart: None,
            ml_predictions: MlPredictions {
                decision_tree: prediction.into(),
                knn: prediction.into(),
            },
            total_records,
            timestamp: Some(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            success: Some(true),
        })
    }

    async fn health(&self) -> Result<(), DomainError> {
        info!("[MOCK] analysis service healthy");
        Ok(())
    }
}
