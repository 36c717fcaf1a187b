//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values. `#[serde(default)]` lets a settings
//! file name only the fields it wants to change.

mod backends;
mod runtime;

pub use backends::*;
pub use runtime::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "speech": { "apiKey": "AIza...", "workerPoolSize": 8 },
///   "feedback": { "model": "gemini-2.5-flash" },
///   "audio": { "maxBytes": 5242880 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudSettings {
    /// Speech-recognition backend settings.
    pub speech: SpeechSettings,
    /// Generative feedback backend settings.
    pub feedback: FeedbackSettings,
    /// Audio payload limits.
    pub audio: AudioSettings,
    /// Pipeline-level settings.
    pub pipeline: PipelineSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl BudSettings {
    /// Clamp out-of-range values and correct broken invariants.
    ///
    /// Called automatically during loading. Out-of-range values are corrected
    /// with a warning rather than rejected.
    pub fn validate(&mut self) {
        fn clamp(val: &mut f64, min: f64, max: f64, name: &str) {
            if *val < min || *val > max || val.is_nan() {
                let clamped = if val.is_nan() { min } else { val.clamp(min, max) };
                tracing::warn!("{name} out of range ({val}), clamped to {clamped}");
                *val = clamped;
            }
        }

        fn at_least_one(val: &mut usize, name: &str) {
            if *val == 0 {
                tracing::warn!("{name} must be at least 1, correcting");
                *val = 1;
            }
        }

        clamp(
            &mut self.speech.low_confidence_threshold,
            0.0,
            1.0,
            "low_confidence_threshold",
        );
        clamp(&mut self.feedback.free_text_temperature, 0.0, 2.0, "free_text_temperature");
        clamp(
            &mut self.feedback.structured_temperature,
            0.0,
            2.0,
            "structured_temperature",
        );
        clamp(&mut self.feedback.top_p, 0.0, 1.0, "top_p");

        at_least_one(&mut self.speech.worker_pool_size, "speech worker_pool_size");
        at_least_one(&mut self.feedback.worker_pool_size, "feedback worker_pool_size");

        let audio = &mut self.audio;
        if audio.min_bytes > audio.max_bytes {
            tracing::warn!(
                "audio min_bytes ({}) > max_bytes ({}), correcting",
                audio.min_bytes,
                audio.max_bytes
            );
            audio.min_bytes = audio.max_bytes;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
