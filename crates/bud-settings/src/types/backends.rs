//! Speech and feedback backend settings.

use serde::{Deserialize, Serialize};

/// Google Speech-to-Text backend settings.
///
/// The live backend is used when either `api_key` or `access_token` is set;
/// otherwise the pipeline runs with the unavailable speech backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechSettings {
    /// API key sent as the `key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// OAuth access token sent as a bearer token (takes precedence over `api_key`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// REST base URL.
    pub base_url: String,
    /// BCP-47 recognition language.
    pub language_code: String,
    /// Recognition model variant (`default` lets the API choose).
    pub model_variant: String,
    /// Maximum concurrent speech backend calls.
    pub worker_pool_size: usize,
    /// Confidence below which a transcript is logged as low-confidence.
    pub low_confidence_threshold: f64,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            access_token: None,
            base_url: "https://speech.googleapis.com/v1".to_string(),
            language_code: "ja-JP".to_string(),
            model_variant: "default".to_string(),
            worker_pool_size: 4,
            low_confidence_threshold: 0.3,
            request_timeout_ms: 30_000,
        }
    }
}

/// Gemini feedback backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackSettings {
    /// Gemini API key. Without it the generator always returns fallback feedback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// REST base URL.
    pub base_url: String,
    /// Model ID.
    pub model: String,
    /// Output token cap per generation.
    pub max_output_tokens: u32,
    /// Top-P sampling.
    pub top_p: f64,
    /// Top-K sampling.
    pub top_k: u32,
    /// Temperature for free-text (short/general) feedback.
    pub free_text_temperature: f64,
    /// Temperature for structured (detailed) feedback.
    pub structured_temperature: f64,
    /// Maximum concurrent feedback backend calls.
    pub worker_pool_size: usize,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 300,
            top_p: 0.9,
            top_k: 40,
            free_text_temperature: 0.7,
            structured_temperature: 0.3,
            worker_pool_size: 4,
            request_timeout_ms: 30_000,
        }
    }
}
