//! Speech backend capability.
//!
//! The pipeline depends only on [`SpeechBackend`]. At startup exactly one
//! implementation is chosen: [`GoogleSpeechBackend`](crate::google::GoogleSpeechBackend)
//! when credentials exist, [`UnavailableSpeechBackend`] otherwise.

use async_trait::async_trait;
use bud_core::OffloadError;
use bytes::Bytes;

use crate::format::TranscriptionConfig;

/// Top hypothesis returned by a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Recognition {
    /// Transcript text, trimmed.
    pub transcript: String,
    /// Backend confidence in `[0, 1]`, when reported.
    pub confidence: Option<f32>,
}

/// Faults raised by a speech backend.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No credentials; the live backend was never constructed.
    #[error("speech recognition service is not configured")]
    NotConfigured,

    /// Network or transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the API.
    #[error("speech API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Quota exhausted.
    #[error("speech API rate limited: {message}")]
    RateLimited {
        /// Error message from the response body.
        message: String,
    },

    /// Credential could not be encoded into a request header.
    #[error("invalid speech credentials: {0}")]
    Auth(String),

    /// The offloaded call did not complete.
    #[error(transparent)]
    Offload(#[from] OffloadError),
}

impl SpeechError {
    /// Short category for metric labels.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::RateLimited { .. } => "rate_limited",
            Self::Auth(_) => "auth",
            Self::Offload(_) => "offload",
        }
    }
}

/// A speech-to-text backend.
///
/// Implementations must be shareable across tasks; each call is driven on an
/// offloaded task by the transcription client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Backend name for logs, health, and metric labels.
    fn name(&self) -> &'static str;

    /// Whether the backend can serve requests at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Recognize speech in `audio`.
    ///
    /// `Ok(None)` means the backend answered but heard no speech.
    async fn recognize(
        &self,
        audio: Bytes,
        config: &TranscriptionConfig,
    ) -> Result<Option<Recognition>, SpeechError>;
}

/// Backend used when no credentials are configured. Every call fails with
/// [`SpeechError::NotConfigured`] without touching the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableSpeechBackend;

#[async_trait]
impl SpeechBackend for UnavailableSpeechBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn recognize(
        &self,
        _audio: Bytes,
        _config: &TranscriptionConfig,
    ) -> Result<Option<Recognition>, SpeechError> {
        Err(SpeechError::NotConfigured)
    }
}
