//! Gemini `generateContent` REST backend.

use std::time::Duration;

use async_trait::async_trait;
use bud_core::http::api_error_message;
use bud_settings::FeedbackSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::backend::{FeedbackBackend, FeedbackError, GenerationParams};

/// Default REST base URL (API-key auth).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    fn into_text(self) -> Result<String, FeedbackError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(FeedbackError::EmptyResponse {
                reason: block_reason.unwrap_or_else(|| "no candidates".to_string()),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(FeedbackError::EmptyResponse {
                reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "empty text".to_string()),
            });
        }
        Ok(text)
    }
}

/// Live backend calling the Gemini REST API.
pub struct GeminiBackend {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedbackError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, api_key, model, client))
    }

    /// Create a backend with a shared HTTP client.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Build from settings, or `None` without an API key.
    pub fn from_settings(settings: &FeedbackSettings) -> Result<Option<Self>, FeedbackError> {
        let Some(key) = settings.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        Self::new(
            &settings.base_url,
            key,
            &settings.model,
            Duration::from_millis(settings.request_timeout_ms),
        )
        .map(Some)
    }

    /// Model ID.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl FeedbackBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(
        skip_all,
        fields(backend = "gemini", model = %self.model, temperature = params.temperature)
    )]
    async fn generate(
        &self,
        prompt: String,
        params: GenerationParams,
    ) -> Result<String, FeedbackError> {
        let body = GenerateContentRequest {
            contents: [GeminiContent {
                role: "user",
                parts: [RequestPart { text: &prompt }],
            }],
            generation_config: params,
        };

        debug!(prompt_chars = prompt.chars().count(), "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = api_error_message(&body_text, status.as_u16());
            error!(status = status.as_u16(), %message, "Gemini API error");
            if status.as_u16() == 429 {
                return Err(FeedbackError::RateLimited { message });
            }
            return Err(FeedbackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_text()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
