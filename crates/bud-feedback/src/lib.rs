//! # bud-feedback
//!
//! Turns a transcript into warm feedback for the child.
//!
//! - [`types`]: request, result, and provenance types
//! - [`prompts`]: per-mode prompt templates
//! - [`parse`]: strict structured parsing plus canned fallbacks (pure)
//! - [`backend`]: [`FeedbackBackend`] capability and the unavailable variant
//! - [`gemini`]: Gemini REST backend
//! - [`generator`]: [`FeedbackGenerator`], which never fails
//!
//! ## Crate Position
//!
//! Depends on bud-core, bud-settings. Depended on by bud-pipeline.

#![deny(unsafe_code)]

pub mod backend;
pub mod gemini;
pub mod generator;
pub mod parse;
pub mod prompts;
pub mod types;

pub use backend::{FeedbackBackend, FeedbackError, GenerationParams, UnavailableFeedbackBackend};
pub use gemini::GeminiBackend;
pub use generator::FeedbackGenerator;
pub use parse::ParsedOutput;
pub use types::{
    FeedbackMode, FeedbackRequest, FeedbackResult, FeedbackSource, GeneratedFeedback,
    PhraseSuggestion, StructuredFeedback, UnknownModeError,
};
