//! Transcription client: offloads backend calls and normalizes outcomes.
//!
//! [`TranscriptionClient::transcribe`] never returns an error. Every backend
//! outcome, including faults and panics inside the backend, is folded into a
//! [`TranscriptionResult`] with `success = false` and a message.

use std::sync::Arc;
use std::time::Instant;

use bud_core::OffloadPool;
use bud_core::metrics::{
    TRANSCRIPTION_DURATION_SECONDS, TRANSCRIPTION_LOW_CONFIDENCE_TOTAL,
    TRANSCRIPTION_REQUESTS_TOTAL,
};
use bud_core::text::preview;
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::backend::{Recognition, SpeechBackend, SpeechError};
use crate::format::{AudioEncoding, FormatResolver, TranscriptionConfig};
use crate::payload::AudioPayload;

/// Error text returned when the backend heard no speech.
pub const NO_SPEECH_MESSAGE: &str = "could not recognize speech";

/// Confidence below which a transcript is logged as low-confidence.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Default number of concurrent backend calls.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;

/// Why a transcription did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionFault {
    /// Backend answered but detected no speech. An expected outcome.
    NoSpeech,
    /// No backend is configured.
    Unavailable,
    /// Network, quota, API, or offload failure.
    Backend,
}

impl TranscriptionFault {
    /// Whether this fault means the backend itself is degraded.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Unavailable | Self::Backend)
    }

    fn label(self) -> &'static str {
        match self {
            Self::NoSpeech => "no_speech",
            Self::Unavailable => "unavailable",
            Self::Backend => "error",
        }
    }
}

/// Outcome of one transcription attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionResult {
    /// Whether a transcript was produced.
    pub success: bool,
    /// Transcript text; empty on failure.
    pub text: String,
    /// Backend confidence; absent on failure or when not reported.
    pub confidence: Option<f32>,
    /// Failure message.
    pub error: Option<String>,
    /// Failure classification.
    #[serde(skip)]
    pub fault: Option<TranscriptionFault>,
}

impl TranscriptionResult {
    /// Successful result.
    pub fn recognized(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            success: true,
            text: text.into(),
            confidence,
            error: None,
            fault: None,
        }
    }

    /// Failed result.
    pub fn failed(fault: TranscriptionFault, message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: String::new(),
            confidence: None,
            error: Some(message.into()),
            fault: Some(fault),
        }
    }

    fn from_error(err: &SpeechError) -> Self {
        match err {
            SpeechError::NotConfigured => {
                Self::failed(TranscriptionFault::Unavailable, err.to_string())
            }
            other => Self::failed(
                TranscriptionFault::Backend,
                format!("speech recognition error: {other}"),
            ),
        }
    }
}

/// Liveness snapshot. No network call is made to build it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeechHealth {
    /// Whether the backend can serve requests.
    pub healthy: bool,
    /// Backend name.
    pub backend: &'static str,
    /// Recognition language of the default configuration.
    pub language_code: String,
    /// Encoding of the default configuration.
    pub encoding: AudioEncoding,
    /// Sample rate of the default configuration.
    pub sample_rate: u32,
    /// Reason the backend is unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Speech-to-text client shared by all pipeline runs.
pub struct TranscriptionClient {
    backend: Arc<dyn SpeechBackend>,
    pool: OffloadPool,
    resolver: FormatResolver,
    low_confidence_threshold: f32,
}

impl TranscriptionClient {
    /// Client with a worker pool of `pool_size` and default threshold.
    pub fn new(backend: Arc<dyn SpeechBackend>, pool_size: usize) -> Self {
        Self {
            backend,
            pool: OffloadPool::new("speech", pool_size),
            resolver: FormatResolver::default(),
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }

    /// Override the low-confidence log threshold.
    #[must_use]
    pub fn with_low_confidence_threshold(mut self, threshold: f32) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    /// Override the resolver used for the health snapshot.
    #[must_use]
    pub fn with_resolver(mut self, resolver: FormatResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Whether the backend can serve requests.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Transcribe `payload` with `config`.
    #[instrument(
        skip_all,
        fields(backend = self.backend.name(), encoding = %config.encoding, bytes = payload.len())
    )]
    pub async fn transcribe(
        &self,
        payload: &AudioPayload,
        config: &TranscriptionConfig,
    ) -> TranscriptionResult {
        let backend = Arc::clone(&self.backend);
        let audio = payload.bytes().clone();
        let owned_config = config.clone();

        let started = Instant::now();
        let outcome = self
            .pool
            .run(async move { backend.recognize(audio, &owned_config).await })
            .await
            .map_err(SpeechError::from)
            .and_then(|r| r);
        histogram!(TRANSCRIPTION_DURATION_SECONDS, "backend" => self.backend.name())
            .record(started.elapsed().as_secs_f64());

        let result = match outcome {
            Ok(Some(recognition)) => self.accept(recognition),
            Ok(None) => {
                info!("no speech recognized");
                TranscriptionResult::failed(TranscriptionFault::NoSpeech, NO_SPEECH_MESSAGE)
            }
            Err(err) => {
                warn!(error = %err, category = err.category(), "speech recognition failed");
                TranscriptionResult::from_error(&err)
            }
        };

        let outcome_label = result.fault.map_or("success", TranscriptionFault::label);
        counter!(TRANSCRIPTION_REQUESTS_TOTAL, "outcome" => outcome_label).increment(1);
        result
    }

    fn accept(&self, recognition: Recognition) -> TranscriptionResult {
        if self.is_low_confidence(recognition.confidence) {
            warn!(
                confidence = recognition.confidence,
                threshold = self.low_confidence_threshold,
                "low confidence speech recognition result"
            );
            counter!(TRANSCRIPTION_LOW_CONFIDENCE_TOTAL).increment(1);
        }
        info!(
            confidence = recognition.confidence,
            transcript = %preview(&recognition.transcript),
            "speech recognized"
        );
        TranscriptionResult::recognized(recognition.transcript, recognition.confidence)
    }

    /// A result without a confidence score counts as zero confidence.
    fn is_low_confidence(&self, confidence: Option<f32>) -> bool {
        confidence.unwrap_or(0.0) < self.low_confidence_threshold
    }

    /// Report backend readiness using the default configuration.
    pub fn health_check(&self) -> SpeechHealth {
        let config = self.resolver.default_config();
        let healthy = self.backend.is_available();
        SpeechHealth {
            healthy,
            backend: self.backend.name(),
            language_code: config.language_code,
            encoding: config.encoding,
            sample_rate: config.sample_rate_hertz,
            error: (!healthy).then(|| "speech backend not configured".to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
