//! # bud-pipeline
//!
//! Single entry point from raw audio to transcript plus feedback.
//!
//! [`Pipeline::run`] validates the payload (failing fast with no backend
//! calls), resolves the recognition config, transcribes, and, only when
//! transcription succeeded, asks for feedback. Backend trouble never becomes
//! an error here; it shows up in [`BackendDegraded`].
//!
//! ## Crate Position
//!
//! Depends on bud-core, bud-settings, bud-speech, bud-feedback.
//! Depended on by the `bud` binary.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod pipeline;
pub mod result;

pub use bootstrap::{select_feedback_backend, select_speech_backend};
pub use pipeline::Pipeline;
pub use result::{BackendDegraded, FeedbackHealth, PipelineError, PipelineHealth, PipelineResult};
