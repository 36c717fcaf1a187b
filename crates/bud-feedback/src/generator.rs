//! Feedback generator: prompt → offloaded backend call → parsed result.
//!
//! [`FeedbackGenerator::generate`] always returns feedback of the requested
//! shape. Backend absence, backend faults, and panics all end in the canned
//! fallback from [`crate::parse`].

use std::sync::Arc;
use std::time::Instant;

use bud_core::OffloadPool;
use bud_core::metrics::{FEEDBACK_DURATION_SECONDS, FEEDBACK_REQUESTS_TOTAL};
use bud_settings::FeedbackSettings;
use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::backend::{FeedbackBackend, FeedbackError, GenerationParams};
use crate::parse::{ParsedOutput, fallback_for, from_unparsed, parse_structured};
use crate::prompts::build_prompt;
use crate::types::{FeedbackRequest, FeedbackResult, FeedbackSource, GeneratedFeedback};

/// Feedback generator shared by all pipeline runs.
pub struct FeedbackGenerator {
    backend: Arc<dyn FeedbackBackend>,
    pool: OffloadPool,
    free_text: GenerationParams,
    structured: GenerationParams,
}

impl FeedbackGenerator {
    /// Generator with default sampling (0.7 free-text, 0.3 structured).
    pub fn new(backend: Arc<dyn FeedbackBackend>, pool_size: usize) -> Self {
        let free_text = GenerationParams::default();
        Self {
            backend,
            pool: OffloadPool::new("feedback", pool_size),
            free_text,
            structured: free_text.with_temperature(0.3),
        }
    }

    /// Generator with sampling and pool size taken from settings.
    pub fn from_settings(backend: Arc<dyn FeedbackBackend>, settings: &FeedbackSettings) -> Self {
        let (free_text, structured) = GenerationParams::pair_from_settings(settings);
        Self {
            backend,
            pool: OffloadPool::new("feedback", settings.worker_pool_size),
            free_text,
            structured,
        }
    }

    /// Whether a live backend is configured. When `false`, every call
    /// returns the fallback without contacting anything.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Generate feedback for `request`.
    #[instrument(skip_all, fields(mode = %request.mode, backend = self.backend.name()))]
    pub async fn generate(&self, request: &FeedbackRequest) -> GeneratedFeedback {
        let generated = if self.backend.is_available() {
            match self.call_backend(request).await {
                Ok(text) => Self::interpret(request, &text),
                Err(err) => {
                    warn!(
                        error = %err,
                        category = err.category(),
                        "feedback generation failed, using fallback"
                    );
                    Self::fallback(request)
                }
            }
        } else {
            warn!("feedback backend unavailable, using fallback");
            Self::fallback(request)
        };

        counter!(
            FEEDBACK_REQUESTS_TOTAL,
            "mode" => request.mode.as_str(),
            "source" => generated.source.as_str()
        )
        .increment(1);
        generated
    }

    async fn call_backend(&self, request: &FeedbackRequest) -> Result<String, FeedbackError> {
        let params = if request.mode.is_structured() {
            self.structured
        } else {
            self.free_text
        };
        let prompt = build_prompt(request);
        let backend = Arc::clone(&self.backend);

        debug!(transcript_chars = request.transcript.chars().count(), "calling feedback backend");
        let started = Instant::now();
        let outcome = self
            .pool
            .run(async move { backend.generate(prompt, params).await })
            .await
            .map_err(FeedbackError::from)
            .and_then(|r| r);
        histogram!(FEEDBACK_DURATION_SECONDS, "backend" => self.backend.name())
            .record(started.elapsed().as_secs_f64());

        let text = outcome?;
        if text.trim().is_empty() {
            return Err(FeedbackError::EmptyResponse {
                reason: "blank text".to_string(),
            });
        }
        Ok(text)
    }

    fn interpret(request: &FeedbackRequest, text: &str) -> GeneratedFeedback {
        if !request.mode.is_structured() {
            let feedback = text.trim().to_string();
            info!(chars = feedback.chars().count(), "feedback generated");
            return GeneratedFeedback {
                feedback: FeedbackResult::Text(feedback),
                source: FeedbackSource::Backend,
            };
        }

        match parse_structured(text) {
            ParsedOutput::Parsed(structured) => {
                info!("structured feedback generated");
                GeneratedFeedback {
                    feedback: FeedbackResult::Structured(structured),
                    source: FeedbackSource::Backend,
                }
            }
            ParsedOutput::Unparsed(raw) => {
                warn!("structured feedback was not valid JSON, wrapping raw text");
                GeneratedFeedback {
                    feedback: FeedbackResult::Structured(from_unparsed(&raw, &request.transcript)),
                    source: FeedbackSource::Unparsed,
                }
            }
        }
    }

    fn fallback(request: &FeedbackRequest) -> GeneratedFeedback {
        GeneratedFeedback {
            feedback: fallback_for(request.mode, &request.transcript),
            source: FeedbackSource::Fallback,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
