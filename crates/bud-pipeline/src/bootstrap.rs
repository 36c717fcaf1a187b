//! Backend selection at process start.
//!
//! Each backend is chosen once: the live implementation when credentials are
//! present and it constructs cleanly, the unavailable variant otherwise.

use std::sync::Arc;

use bud_feedback::{FeedbackBackend, FeedbackGenerator, GeminiBackend, UnavailableFeedbackBackend};
use bud_settings::{BudSettings, FeedbackSettings, SpeechSettings};
use bud_speech::{
    AudioValidator, FormatResolver, GoogleSpeechBackend, SpeechBackend, TranscriptionClient,
    UnavailableSpeechBackend,
};
use tracing::{error, info, warn};

use crate::pipeline::Pipeline;

impl Pipeline {
    /// Build a pipeline from loaded settings.
    ///
    /// Never fails: a backend that cannot be constructed is replaced by its
    /// unavailable variant and the pipeline runs degraded.
    pub fn from_settings(settings: &BudSettings) -> Self {
        let resolver = FormatResolver::from_settings(&settings.speech);
        let transcription = TranscriptionClient::new(
            select_speech_backend(&settings.speech),
            settings.speech.worker_pool_size,
        )
        .with_low_confidence_threshold(settings.speech.low_confidence_threshold as f32)
        .with_resolver(resolver.clone());
        let feedback = FeedbackGenerator::from_settings(
            select_feedback_backend(&settings.feedback),
            &settings.feedback,
        );

        Self::new(
            AudioValidator::from_settings(&settings.audio),
            resolver,
            transcription,
            feedback,
        )
    }
}

/// Live speech backend when credentials are present, unavailable otherwise.
pub fn select_speech_backend(settings: &SpeechSettings) -> Arc<dyn SpeechBackend> {
    match GoogleSpeechBackend::from_settings(settings) {
        Ok(Some(backend)) => {
            info!(base_url = %settings.base_url, "speech backend: google");
            Arc::new(backend)
        }
        Ok(None) => {
            warn!("no speech credentials configured, transcription unavailable");
            Arc::new(UnavailableSpeechBackend)
        }
        Err(e) => {
            error!(error = %e, "failed to construct speech backend, transcription unavailable");
            Arc::new(UnavailableSpeechBackend)
        }
    }
}

/// Live feedback backend when an API key is present, unavailable otherwise.
pub fn select_feedback_backend(settings: &FeedbackSettings) -> Arc<dyn FeedbackBackend> {
    match GeminiBackend::from_settings(settings) {
        Ok(Some(backend)) => {
            info!(model = %settings.model, "feedback backend: gemini");
            Arc::new(backend)
        }
        Ok(None) => {
            warn!("GEMINI_API_KEY not set, feedback will use fallback responses");
            Arc::new(UnavailableFeedbackBackend)
        }
        Err(e) => {
            error!(error = %e, "failed to construct feedback backend, using fallback responses");
            Arc::new(UnavailableFeedbackBackend)
        }
    }
}
