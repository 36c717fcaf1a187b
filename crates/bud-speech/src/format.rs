//! Container format → recognition configuration.
//!
//! Resolution is total: unknown or missing formats fall through to the
//! WEBM/Opus default instead of failing, because the declared extension is
//! not trustworthy enough to reject on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Encodings the speech backend is asked to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// Uncompressed 16-bit little-endian PCM (WAV).
    Linear16,
    /// MPEG layer III.
    Mp3,
    /// Opus in a WebM container (browser `MediaRecorder` default).
    WebmOpus,
}

impl AudioEncoding {
    /// Wire name used by the speech API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear16 => "LINEAR16",
            Self::Mp3 => "MP3",
            Self::WebmOpus => "WEBM_OPUS",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognition parameters for one payload. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionConfig {
    /// Audio encoding.
    pub encoding: AudioEncoding,
    /// Sample rate in hertz.
    pub sample_rate_hertz: u32,
    /// BCP-47 recognition language.
    pub language_code: String,
    /// Insert punctuation into the transcript.
    pub enable_punctuation: bool,
    /// Mask profanity in the transcript.
    pub profanity_filter: bool,
    /// Number of hypotheses requested.
    pub max_alternatives: u32,
    /// Backend model variant.
    pub model_variant: String,
}

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE_CODE: &str = "ja-JP";
/// Model variant used when none is configured.
pub const DEFAULT_MODEL_VARIANT: &str = "default";

/// Maps declared formats to [`TranscriptionConfig`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatResolver {
    language_code: String,
    model_variant: String,
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE_CODE, DEFAULT_MODEL_VARIANT)
    }
}

impl FormatResolver {
    /// Resolver stamping every config with `language_code` and `model_variant`.
    pub fn new(language_code: impl Into<String>, model_variant: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            model_variant: model_variant.into(),
        }
    }

    /// Resolver from loaded speech settings.
    pub fn from_settings(settings: &bud_settings::SpeechSettings) -> Self {
        Self::new(&settings.language_code, &settings.model_variant)
    }

    /// Resolve a declared format token (case-insensitive).
    pub fn resolve(&self, declared_format: &str) -> TranscriptionConfig {
        let token = declared_format.trim().to_ascii_lowercase();
        let (encoding, sample_rate_hertz) = match token.as_str() {
            "wav" | "wave" => (AudioEncoding::Linear16, 16_000),
            "mp3" => (AudioEncoding::Mp3, 16_000),
            _ => (AudioEncoding::WebmOpus, 48_000),
        };
        TranscriptionConfig {
            encoding,
            sample_rate_hertz,
            language_code: self.language_code.clone(),
            enable_punctuation: true,
            profanity_filter: true,
            max_alternatives: 1,
            model_variant: self.model_variant.clone(),
        }
    }

    /// Configuration used when nothing is declared.
    pub fn default_config(&self) -> TranscriptionConfig {
        self.resolve("")
    }
}

/// Resolve with the default language and model variant.
pub fn resolve(declared_format: &str) -> TranscriptionConfig {
    FormatResolver::default().resolve(declared_format)
}
