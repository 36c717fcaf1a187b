//! Pipeline orchestrator: validate → resolve → transcribe → feedback.

use std::time::{Duration, Instant};

use bud_core::metrics::{BACKEND_DEGRADED_TOTAL, PIPELINE_DURATION_SECONDS, PIPELINE_RUNS_TOTAL};
use bud_feedback::{FeedbackGenerator, FeedbackMode, FeedbackRequest};
use bud_speech::{
    AudioPayload, AudioValidator, FormatResolver, TranscriptionClient, TranscriptionFault,
    ValidationError,
};
use metrics::{counter, histogram};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::result::{
    BackendDegraded, FeedbackHealth, PipelineError, PipelineHealth, PipelineResult,
};

/// Composes the validator, resolver, transcription client, and feedback
/// generator into one call.
///
/// Backend handles are created once and shared read-only by every run;
/// concurrent runs share nothing else.
pub struct Pipeline {
    validator: AudioValidator,
    resolver: FormatResolver,
    transcription: TranscriptionClient,
    feedback: FeedbackGenerator,
}

impl Pipeline {
    /// Assemble a pipeline from its parts.
    pub fn new(
        validator: AudioValidator,
        resolver: FormatResolver,
        transcription: TranscriptionClient,
        feedback: FeedbackGenerator,
    ) -> Self {
        Self {
            validator,
            resolver,
            transcription,
            feedback,
        }
    }

    /// The transcription client.
    pub fn transcription(&self) -> &TranscriptionClient {
        &self.transcription
    }

    /// The feedback generator.
    pub fn feedback(&self) -> &FeedbackGenerator {
        &self.feedback
    }

    /// Run the full pipeline on one payload.
    ///
    /// Only validation failures are returned as errors; backend problems show
    /// up as degraded content in the [`PipelineResult`].
    pub async fn run(
        &self,
        payload: &AudioPayload,
        declared_format: &str,
        mode: FeedbackMode,
        child_age: Option<u8>,
    ) -> Result<PipelineResult, ValidationError> {
        let run_id = Uuid::now_v7();
        let span = info_span!(
            "pipeline_run",
            %run_id,
            format = declared_format,
            %mode,
            bytes = payload.len()
        );
        self.run_inner(payload, declared_format, mode, child_age)
            .instrument(span)
            .await
    }

    /// [`run`](Self::run) bounded by `deadline`.
    ///
    /// Expiry drops the in-flight run and returns
    /// [`PipelineError::BackendTimeout`]. Offloaded backend calls already
    /// holding a worker permit finish in the background.
    pub async fn run_with_deadline(
        &self,
        payload: &AudioPayload,
        declared_format: &str,
        mode: FeedbackMode,
        child_age: Option<u8>,
        deadline: Duration,
    ) -> Result<PipelineResult, PipelineError> {
        let run = self.run(payload, declared_format, mode, child_age);
        match tokio::time::timeout(deadline, run).await {
            Ok(result) => result.map_err(PipelineError::from),
            Err(_) => {
                warn!(deadline_ms = deadline.as_millis() as u64, "pipeline deadline exceeded");
                counter!(PIPELINE_RUNS_TOTAL, "outcome" => "timeout").increment(1);
                Err(PipelineError::BackendTimeout { deadline })
            }
        }
    }

    async fn run_inner(
        &self,
        payload: &AudioPayload,
        declared_format: &str,
        mode: FeedbackMode,
        child_age: Option<u8>,
    ) -> Result<PipelineResult, ValidationError> {
        let started = Instant::now();

        if let Err(err) = self.validator.validate(payload) {
            warn!(kind = err.kind(), error = %err, "audio rejected");
            counter!(PIPELINE_RUNS_TOTAL, "outcome" => "rejected").increment(1);
            return Err(err);
        }
        if !payload.has_accepted_content_type() {
            warn!(content_type = payload.content_type(), "unexpected audio content type");
        }

        let config = self.resolver.resolve(declared_format);
        let transcription = self.transcription.transcribe(payload, &config).await;
        let speech_degraded = transcription.fault.is_some_and(TranscriptionFault::is_degraded);

        if !transcription.success {
            info!(
                error = transcription.error.as_deref(),
                "transcription failed, skipping feedback"
            );
            let backend_degraded = BackendDegraded {
                speech: speech_degraded,
                feedback: false,
            };
            record_degraded(backend_degraded);
            counter!(PIPELINE_RUNS_TOTAL, "outcome" => "transcription_failed").increment(1);
            histogram!(PIPELINE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
            return Ok(PipelineResult {
                transcript: String::new(),
                confidence: None,
                feedback: None,
                transcription_error: transcription.error,
                backend_degraded,
            });
        }

        let request =
            FeedbackRequest::new(transcription.text.clone(), mode).with_child_age(child_age);
        let generated = self.feedback.generate(&request).await;
        let backend_degraded = BackendDegraded {
            speech: speech_degraded,
            feedback: generated.is_fallback(),
        };
        record_degraded(backend_degraded);

        counter!(PIPELINE_RUNS_TOTAL, "outcome" => "completed").increment(1);
        histogram!(PIPELINE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        info!(
            source = generated.source.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run completed"
        );

        Ok(PipelineResult {
            transcript: transcription.text,
            confidence: transcription.confidence,
            feedback: Some(generated.feedback),
            transcription_error: None,
            backend_degraded,
        })
    }

    /// Backend readiness, without network calls.
    pub fn health(&self) -> PipelineHealth {
        PipelineHealth {
            speech: self.transcription.health_check(),
            feedback: FeedbackHealth {
                available: self.feedback.is_available(),
                backend: self.feedback.backend_name(),
            },
        }
    }
}

/// One increment per degraded backend per run.
fn record_degraded(degraded: BackendDegraded) {
    for backend in degraded.degraded_backends() {
        counter!(BACKEND_DEGRADED_TOTAL, "backend" => backend).increment(1);
    }
}
