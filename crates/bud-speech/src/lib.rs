//! # bud-speech
//!
//! Everything between raw uploaded audio and a transcript:
//!
//! - [`payload::AudioPayload`]: bytes plus declared content type / filename
//! - [`validator::AudioValidator`]: size gate applied before any network call
//! - [`format::FormatResolver`]: container format → [`format::TranscriptionConfig`]
//! - [`backend::SpeechBackend`]: recognition capability, with the Google REST
//!   backend in [`google`] and [`backend::UnavailableSpeechBackend`]
//! - [`client::TranscriptionClient`]: offloaded, never-failing transcription
//!
//! ## Crate Position
//!
//! Depends on bud-core, bud-settings. Depended on by bud-pipeline.

#![deny(unsafe_code)]

pub mod backend;
pub mod client;
pub mod format;
pub mod google;
pub mod payload;
pub mod validator;

pub use backend::{Recognition, SpeechBackend, SpeechError, UnavailableSpeechBackend};
pub use client::{SpeechHealth, TranscriptionClient, TranscriptionFault, TranscriptionResult};
pub use format::{AudioEncoding, FormatResolver, TranscriptionConfig, resolve};
pub use google::{GoogleSpeechBackend, SpeechAuth};
pub use payload::AudioPayload;
pub use validator::{AudioValidator, ValidationError};
