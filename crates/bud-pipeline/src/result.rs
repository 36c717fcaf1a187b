//! Pipeline output and error types.

use std::time::Duration;

use bud_feedback::FeedbackResult;
use bud_speech::{SpeechHealth, ValidationError};
use serde::Serialize;

/// Which backends produced degraded output during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BackendDegraded {
    /// Speech backend unavailable or faulted. Not set when the backend
    /// simply heard no speech.
    pub speech: bool,
    /// Feedback came from the canned fallback.
    pub feedback: bool,
}

impl BackendDegraded {
    /// Whether any backend was degraded.
    pub fn any(self) -> bool {
        self.speech || self.feedback
    }

    /// Names of the degraded backends, speech first.
    pub fn degraded_backends(self) -> Vec<&'static str> {
        [("speech", self.speech), ("feedback", self.feedback)]
            .into_iter()
            .filter_map(|(name, degraded)| degraded.then_some(name))
            .collect()
    }
}

/// Combined result of one pipeline run.
///
/// Owned by the run that built it; nothing is shared between runs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineResult {
    /// Transcript; empty when transcription did not succeed.
    pub transcript: String,
    /// Backend confidence, when a transcript was produced.
    pub confidence: Option<f32>,
    /// Feedback; absent when transcription did not succeed.
    pub feedback: Option<FeedbackResult>,
    /// Transcription failure message.
    pub transcription_error: Option<String>,
    /// Degradation flags.
    pub backend_degraded: BackendDegraded,
}

/// Failures surfaced to the caller of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Payload rejected before any backend call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller's deadline expired before the run finished.
    #[error("pipeline did not finish within {}ms", deadline.as_millis())]
    BackendTimeout {
        /// The deadline that was exceeded.
        deadline: Duration,
    },
}

/// Feedback backend readiness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedbackHealth {
    /// Whether a live backend is configured.
    pub available: bool,
    /// Backend name.
    pub backend: &'static str,
}

/// Readiness of both backends. Built without network calls.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineHealth {
    /// Speech backend snapshot.
    pub speech: SpeechHealth,
    /// Feedback backend snapshot.
    pub feedback: FeedbackHealth,
}

impl PipelineHealth {
    /// Whether every backend is live.
    pub fn all_available(&self) -> bool {
        self.speech.healthy && self.feedback.available
    }
}
