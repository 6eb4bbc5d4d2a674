//! View model read by the renderer.

use super::entities::{AnalysisPayload, SubmissionResult};

/// Snapshot of what the renderer shows.
///
/// Never `loading` with a result; never both `error` and `result`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationState {
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<AnalysisPayload>,
}

impl PresentationState {
    /// Enter loading: clears any previous outcome.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.result = None;
    }

    /// Apply a finished submission.
    pub fn finish(&mut self, outcome: SubmissionResult) {
        self.loading = false;
        match outcome {
            SubmissionResult::Success(payload) => {
                self.error = None;
                self.result = Some(payload);
            }
            SubmissionResult::Failure(reason) => {
                self.result = None;
                self.error = Some(reason);
            }
        }
    }

    /// Validation failure: shown without entering loading.
    pub fn reject(&mut self, reason: String) {
        self.loading = false;
        self.result = None;
        self.error = Some(reason);
    }

    pub fn is_consistent(&self) -> bool {
        !(self.loading && self.result.is_some()) && !(self.error.is_some() && self.result.is_some())
    }
}
