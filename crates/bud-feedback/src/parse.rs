//! Backend output parsing and canned fallbacks.
//!
//! Every function here is pure. Structured output is either
//! [`ParsedOutput::Parsed`] or [`ParsedOutput::Unparsed`]; the latter is
//! turned into a four-key object by [`from_unparsed`], so callers never see
//! a partial or missing structure.

use bud_core::text::truncate_chars;

use crate::types::{FeedbackMode, FeedbackResult, PhraseSuggestion, StructuredFeedback};

/// Characters of raw backend text kept as `feedback_short` when parsing fails.
pub const UNPARSED_FEEDBACK_CHARS: usize = 100;

/// Characters of transcript quoted in the free-text fallback.
pub const FALLBACK_QUOTE_CHARS: usize = 30;

const FALLBACK_FEEDBACK_SHORT: &str = "英語で話そうとした勇気が素晴らしい！次も頑張ろう！😊";
const FALLBACK_NOTE: &str = "AI フィードバックサービスが一時的に利用できません";
const UNPARSED_NOTE: &str = "JSON形式での生成に失敗しました";

/// Outcome of parsing detailed-mode backend output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedOutput {
    /// Output was a JSON object with all four keys.
    Parsed(StructuredFeedback),
    /// Output was not usable as-is. Holds the trimmed raw text.
    Unparsed(String),
}

/// Strictly parse trimmed backend output as [`StructuredFeedback`].
///
/// Anything that is not a single JSON object carrying all four keys with the
/// expected types is [`ParsedOutput::Unparsed`]. Unknown extra keys are
/// ignored.
pub fn parse_structured(raw: &str) -> ParsedOutput {
    let trimmed = raw.trim();
    match serde_json::from_str::<StructuredFeedback>(trimmed) {
        Ok(parsed) => ParsedOutput::Parsed(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "structured feedback did not parse");
            ParsedOutput::Unparsed(trimmed.to_string())
        }
    }
}

/// Build a conformant object from output that failed to parse.
pub fn from_unparsed(raw: &str, transcript: &str) -> StructuredFeedback {
    StructuredFeedback {
        child_utterances: vec![transcript.to_string()],
        feedback_short: truncate_chars(raw.trim(), UNPARSED_FEEDBACK_CHARS).to_string(),
        phrase_suggestion: PhraseSuggestion {
            en: "Good job!".to_string(),
            ja: "よくできました！".to_string(),
        },
        note: UNPARSED_NOTE.to_string(),
    }
}

/// Resolve parsed output into a structured object.
pub fn into_structured(output: ParsedOutput, transcript: &str) -> StructuredFeedback {
    match output {
        ParsedOutput::Parsed(parsed) => parsed,
        ParsedOutput::Unparsed(raw) => from_unparsed(&raw, transcript),
    }
}

/// Free-text fallback quoting the start of the transcript.
pub fn fallback_text(transcript: &str) -> String {
    let quote = truncate_chars(transcript, FALLBACK_QUOTE_CHARS);
    format!("「{quote}...」とても上手に話せたね！外国人と話す勇気が素晴らしい！次回も頑張ろう！😊")
}

/// Structured fallback used when the backend is unavailable or fails.
pub fn fallback_structured(transcript: &str) -> StructuredFeedback {
    StructuredFeedback {
        child_utterances: vec![transcript.to_string()],
        feedback_short: FALLBACK_FEEDBACK_SHORT.to_string(),
        phrase_suggestion: PhraseSuggestion {
            en: "Hello!".to_string(),
            ja: "こんにちは！".to_string(),
        },
        note: FALLBACK_NOTE.to_string(),
    }
}

/// Fallback matching the shape of `mode`.
pub fn fallback_for(mode: FeedbackMode, transcript: &str) -> FeedbackResult {
    if mode.is_structured() {
        FeedbackResult::Structured(fallback_structured(transcript))
    } else {
        FeedbackResult::Text(fallback_text(transcript))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
