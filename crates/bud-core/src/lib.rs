//! # bud-core
//!
//! Foundation utilities shared by every bud crate:
//!
//! - **HTTP**: [`http::api_error_message`] turns failed REST responses into messages
//! - **Logging**: [`logging::init_subscriber`] installs the `tracing` subscriber
//! - **Offload**: [`offload::OffloadPool`] runs backend calls on spawned tasks
//!   behind a fixed-size permit pool
//! - **Metrics**: [`metrics`] holds metric name constants
//! - **Text**: [`text::preview`] for char-safe truncation of transcripts in logs
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by bud-speech, bud-feedback, bud-pipeline, bud.

#![deny(unsafe_code)]

pub mod http;
pub mod logging;
pub mod metrics;
pub mod offload;
pub mod text;

pub use offload::{OffloadError, OffloadPool};
