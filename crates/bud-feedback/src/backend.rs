//! Generative-text backend capability.

use async_trait::async_trait;
use bud_core::OffloadError;
use bud_settings::FeedbackSettings;
use serde::Serialize;

/// Sampling parameters for one generation call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: f64,
    /// Output token cap.
    pub max_output_tokens: u32,
    /// Top-P sampling.
    pub top_p: f64,
    /// Top-K sampling.
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 300,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

impl GenerationParams {
    /// Free-text and structured parameter sets from settings.
    pub fn pair_from_settings(settings: &FeedbackSettings) -> (Self, Self) {
        let base = Self {
            temperature: settings.free_text_temperature,
            max_output_tokens: settings.max_output_tokens,
            top_p: settings.top_p,
            top_k: settings.top_k,
        };
        (base, base.with_temperature(settings.structured_temperature))
    }

    /// Same parameters with a different temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Faults raised by a feedback backend.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// No API key; the live backend was never constructed.
    #[error("feedback service is not configured")]
    NotConfigured,

    /// Network or transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the API.
    #[error("feedback API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Quota exhausted.
    #[error("feedback API rate limited: {message}")]
    RateLimited {
        /// Error message from the response body.
        message: String,
    },

    /// Response carried no text (blocked, truncated, or empty).
    #[error("feedback backend returned no text: {reason}")]
    EmptyResponse {
        /// Finish or block reason, when reported.
        reason: String,
    },

    /// The offloaded call did not complete.
    #[error(transparent)]
    Offload(#[from] OffloadError),
}

impl FeedbackError {
    /// Short category for metric labels.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::RateLimited { .. } => "rate_limited",
            Self::EmptyResponse { .. } => "empty",
            Self::Offload(_) => "offload",
        }
    }
}

/// A generative-text backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackBackend: Send + Sync {
    /// Backend name for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Whether the backend can serve requests at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Generate text for `prompt`.
    async fn generate(
        &self,
        prompt: String,
        params: GenerationParams,
    ) -> Result<String, FeedbackError>;
}

/// Backend used when no API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableFeedbackBackend;

#[async_trait]
impl FeedbackBackend for UnavailableFeedbackBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        _prompt: String,
        _params: GenerationParams,
    ) -> Result<String, FeedbackError> {
        Err(FeedbackError::NotConfigured)
    }
}
