//! Google Cloud Speech-to-Text REST backend (`speech:recognize`).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bud_core::http::api_error_message;
use bud_settings::SpeechSettings;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::backend::{Recognition, SpeechBackend, SpeechError};
use crate::format::{AudioEncoding, TranscriptionConfig};

/// Default REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// How requests are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum SpeechAuth {
    /// API key sent as the `key` query parameter.
    ApiKey(String),
    /// OAuth access token sent as a bearer token.
    AccessToken(String),
}

impl std::fmt::Debug for SpeechAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::AccessToken(_) => f.write_str("AccessToken(..)"),
        }
    }
}

impl SpeechAuth {
    /// Credentials from settings. The access token wins when both are set.
    pub fn from_settings(settings: &SpeechSettings) -> Option<Self> {
        let usable = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        usable(&settings.access_token)
            .map(Self::AccessToken)
            .or_else(|| usable(&settings.api_key).map(Self::ApiKey))
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: AudioEncoding,
    sample_rate_hertz: u32,
    language_code: &'a str,
    max_alternatives: u32,
    profanity_filter: bool,
    enable_automatic_punctuation: bool,
    model: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f32>,
}

/// Live backend calling the Speech-to-Text REST API.
pub struct GoogleSpeechBackend {
    base_url: String,
    auth: SpeechAuth,
    client: reqwest::Client,
}

impl GoogleSpeechBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(
        base_url: impl Into<String>,
        auth: SpeechAuth,
        timeout: Duration,
    ) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, auth, client))
    }

    /// Create a backend with a shared HTTP client.
    pub fn with_client(
        base_url: impl Into<String>,
        auth: SpeechAuth,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            client,
        }
    }

    /// Build from settings, or `None` when no credentials are present.
    pub fn from_settings(settings: &SpeechSettings) -> Result<Option<Self>, SpeechError> {
        let Some(auth) = SpeechAuth::from_settings(settings) else {
            return Ok(None);
        };
        let timeout = Duration::from_millis(settings.request_timeout_ms);
        Self::new(&settings.base_url, auth, timeout).map(Some)
    }

    fn build_headers(&self) -> Result<HeaderMap, SpeechError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let SpeechAuth::AccessToken(token) = &self.auth {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SpeechError::Auth(format!("invalid access token header: {e}")))?;
            let _ = headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build_request<'a>(audio: &[u8], config: &'a TranscriptionConfig) -> RecognizeRequest<'a> {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: config.encoding,
                sample_rate_hertz: config.sample_rate_hertz,
                language_code: &config.language_code,
                max_alternatives: config.max_alternatives,
                profanity_filter: config.profanity_filter,
                enable_automatic_punctuation: config.enable_punctuation,
                model: &config.model_variant,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        }
    }
}

#[async_trait]
impl SpeechBackend for GoogleSpeechBackend {
    fn name(&self) -> &'static str {
        "google-speech"
    }

    #[instrument(
        skip_all,
        fields(backend = "google-speech", encoding = %config.encoding, bytes = audio.len())
    )]
    async fn recognize(
        &self,
        audio: Bytes,
        config: &TranscriptionConfig,
    ) -> Result<Option<Recognition>, SpeechError> {
        let url = format!("{}/speech:recognize", self.base_url);
        let body = Self::build_request(&audio, config);

        let mut request = self.client.post(&url).headers(self.build_headers()?).json(&body);
        if let SpeechAuth::ApiKey(key) = &self.auth {
            request = request.query(&[("key", key.as_str())]);
        }

        debug!(sample_rate = config.sample_rate_hertz, "sending recognize request");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = api_error_message(&body_text, status.as_u16());
            error!(status = status.as_u16(), %message, "speech API error");
            if status.as_u16() == 429 {
                return Err(SpeechError::RateLimited { message });
            }
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: RecognizeResponse = if text.trim().is_empty() {
            RecognizeResponse::default()
        } else {
            serde_json::from_str(&text)?
        };

        Ok(parsed
            .results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .map(|alt| Recognition {
                transcript: alt.transcript.trim().to_string(),
                confidence: alt.confidence,
            }))
    }
}

/// Pull `error.message` out of a Google error body, falling back to the raw text.
// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
