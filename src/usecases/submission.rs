//! Submission orchestrator. Validates inputs, calls the analysis service once,
//! and publishes the outcome as `PresentationState`.
//!
//! Flow:
//! 1. Reject if a submission is already in flight
//! 2. Validate text -> image -> audio (first failure wins, no network)
//! 3. Enter loading, send one request
//! 4. Apply success payload or failure message, leave loading

use crate::domain::{AnalysisPayload, DomainError, PresentationState, SubmissionResult};
use crate::ports::{AnalysisPort, AnalysisRequest};
use crate::usecases::inputs::InputAggregate;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Service that owns the presentation state and the single in-flight slot.
pub struct SubmissionService {
    analysis: Arc<dyn AnalysisPort>,
    state: watch::Sender<PresentationState>,
}

impl SubmissionService {
    pub fn new(analysis: Arc<dyn AnalysisPort>) -> Self {
        let (state, _) = watch::channel(PresentationState::default());
        Self { analysis, state }
    }

    /// Receiver for the renderer. Sees every state change after it subscribes.
    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PresentationState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Check the backend. Errors are returned, never applied to presentation state.
    pub async fn check_backend(&self) -> Result<(), DomainError> {
        self.analysis.health().await
    }

    /// Submit the current inputs.
    ///
    /// Returns `SubmissionInFlight` without touching state while another call is pending.
    pub async fn submit(&self, inputs: &InputAggregate) -> Result<AnalysisPayload, DomainError> {
        if self.is_loading() {
            warn!("submission rejected: analysis already in progress");
            return Err(DomainError::SubmissionInFlight);
        }

        let (text, image, audio) = match inputs.validated() {
            Ok(parts) => parts,
            Err(e) => {
                info!(reason = %e, "submission blocked by validation");
                self.state.send_modify(|s| s.reject(e.to_string()));
                return Err(e);
            }
        };

        let accepted = self.state.send_if_modified(|s| {
            if s.loading {
                false
            } else {
                s.begin();
                true
            }
        });
        if !accepted {
            return Err(DomainError::SubmissionInFlight);
        }
        let mut guard = LoadingGuard::new(&self.state);

        info!(
            text_len = text.len(),
            image_bytes = image.bytes.len(),
            audio_bytes = audio.bytes.len(),
            "submitting inputs for analysis"
        );
        let request = AnalysisRequest { text, image, audio };
        let outcome = match self.analysis.analyze(request).await {
            Ok(payload) => payload.validate().map(|_| payload),
            Err(e) => Err(e),
        };

        guard.disarm();
        match outcome {
            Ok(payload) => {
                info!(
                    text = %payload.text.label,
                    image = %payload.image.label,
                    audio = %payload.audio.label,
                    total_records = payload.total_records,
                    "analysis complete"
                );
                self.state
                    .send_modify(|s| s.finish(SubmissionResult::Success(payload.clone())));
                Ok(payload)
            }
            Err(e) => {
                let e = match e {
                    DomainError::AnalysisFailed(_) => e,
                    other => DomainError::AnalysisFailed(other.to_string()),
                };
                error!(error = %e, "analysis failed");
                self.state
                    .send_modify(|s| s.finish(SubmissionResult::Failure(e.to_string())));
                Err(e)
            }
        }
    }
}

/// Clears `loading` if the submit future is dropped before it completes.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<PresentationState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<PresentationState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("submission abandoned before completion");
            self.state.send_modify(|s| s.loading = false);
        }
    }
}
