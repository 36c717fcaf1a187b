//! Audio limits, pipeline, and logging settings.

use serde::{Deserialize, Serialize};

/// Audio payload size limits enforced before any backend call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    /// Smallest accepted payload in bytes.
    pub min_bytes: usize,
    /// Largest accepted payload in bytes.
    pub max_bytes: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            min_bytes: 100,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Pipeline-level settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Deadline for one full pipeline run, used by callers of
    /// `run_with_deadline`.
    pub deadline_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { deadline_ms: 60_000 }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive (e.g. `info`, `bud_speech=debug,warn`).
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
