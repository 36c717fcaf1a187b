//! Metric name constants to avoid typos across crates.
//!
//! Recording goes through the `metrics` facade. Without an installed
//! recorder every macro call is a no-op.

/// Transcription attempts total (counter, labels: outcome).
pub const TRANSCRIPTION_REQUESTS_TOTAL: &str = "transcription_requests_total";
/// Speech backend call duration seconds (histogram, labels: backend).
pub const TRANSCRIPTION_DURATION_SECONDS: &str = "transcription_duration_seconds";
/// Low-confidence transcripts total (counter).
pub const TRANSCRIPTION_LOW_CONFIDENCE_TOTAL: &str = "transcription_low_confidence_total";
/// Feedback generations total (counter, labels: mode, source).
pub const FEEDBACK_REQUESTS_TOTAL: &str = "feedback_requests_total";
/// Feedback backend call duration seconds (histogram, labels: backend).
pub const FEEDBACK_DURATION_SECONDS: &str = "feedback_duration_seconds";
/// Pipeline runs total (counter, labels: outcome).
pub const PIPELINE_RUNS_TOTAL: &str = "pipeline_runs_total";
/// Pipeline run duration seconds (histogram).
pub const PIPELINE_DURATION_SECONDS: &str = "pipeline_duration_seconds";
/// Runs whose output a backend degraded (counter, labels: backend).
pub const BACKEND_DEGRADED_TOTAL: &str = "backend_degraded_total";
/// Offload tasks waiting for a permit (gauge, labels: pool).
pub const OFFLOAD_QUEUED: &str = "offload_queued";
