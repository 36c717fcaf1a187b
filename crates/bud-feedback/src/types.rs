//! Feedback request and result types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much feedback to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// About 100 characters of encouragement.
    #[default]
    Short,
    /// Four-key structured object.
    Detailed,
    /// Up to 150 characters of general praise.
    General,
}

impl FeedbackMode {
    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Detailed => "detailed",
            Self::General => "general",
        }
    }

    /// Whether this mode produces [`StructuredFeedback`].
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Detailed)
    }
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized mode string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback mode '{0}' (expected short, detailed, or general)")]
pub struct UnknownModeError(pub String);

impl FromStr for FeedbackMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "detailed" => Ok(Self::Detailed),
            "general" => Ok(Self::General),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

/// Input to the feedback generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackRequest {
    /// Transcript to give feedback on.
    pub transcript: String,
    /// Child's age, embedded in the detailed prompt when known.
    pub child_age: Option<u8>,
    /// Requested mode.
    pub mode: FeedbackMode,
}

impl FeedbackRequest {
    /// Request without an age.
    pub fn new(transcript: impl Into<String>, mode: FeedbackMode) -> Self {
        Self {
            transcript: transcript.into(),
            child_age: None,
            mode,
        }
    }

    /// Attach the child's age.
    #[must_use]
    pub fn with_child_age(mut self, age: Option<u8>) -> Self {
        self.child_age = age;
        self
    }
}

/// A short English phrase with its Japanese gloss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSuggestion {
    /// English phrase.
    pub en: String,
    /// Japanese explanation.
    pub ja: String,
}

/// Detailed-mode feedback. Always carries all four keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFeedback {
    /// Utterances attributed to the child, in order.
    pub child_utterances: Vec<String>,
    /// Short encouraging comment.
    pub feedback_short: String,
    /// Suggested next phrase.
    pub phrase_suggestion: PhraseSuggestion,
    /// Free-form note (may be empty).
    pub note: String,
}

/// Feedback returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackResult {
    /// Short/general mode text.
    Text(String),
    /// Detailed mode object.
    Structured(StructuredFeedback),
}

impl FeedbackResult {
    /// Text, if this is a free-text result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Structured object, if this is a detailed result.
    pub fn as_structured(&self) -> Option<&StructuredFeedback> {
        match self {
            Self::Structured(s) => Some(s),
            Self::Text(_) => None,
        }
    }
}

/// Where a [`FeedbackResult`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSource {
    /// Backend output, used as returned.
    Backend,
    /// Backend answered, but structured output did not parse.
    Unparsed,
    /// Canned fallback; the backend was unavailable or failed.
    Fallback,
}

impl FeedbackSource {
    /// Lower-case label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Unparsed => "unparsed",
            Self::Fallback => "fallback",
        }
    }
}

/// Generator output: the feedback plus its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFeedback {
    /// Feedback for the caller.
    pub feedback: FeedbackResult,
    /// Where it came from.
    pub source: FeedbackSource,
}

impl GeneratedFeedback {
    /// Whether the canned fallback was used.
    pub fn is_fallback(&self) -> bool {
        self.source == FeedbackSource::Fallback
    }
}
