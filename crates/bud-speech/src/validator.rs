//! Size checks applied to audio before any backend call.

use bud_settings::AudioSettings;

use crate::payload::AudioPayload;

/// Default minimum payload size in bytes.
pub const DEFAULT_MIN_BYTES: usize = 100;
/// Default maximum payload size in bytes (10 MiB).
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Caller-input faults. Reported immediately; no backend is contacted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Zero-byte payload.
    #[error("audio data is empty")]
    Empty,

    /// Payload below the minimum size; almost certainly not audio.
    #[error("audio data too small ({len} bytes, minimum {min})")]
    TooSmall {
        /// Payload length.
        len: usize,
        /// Configured minimum.
        min: usize,
    },

    /// Payload above the maximum size.
    #[error("file size too large (limit: {})", human_size(*limit))]
    TooLarge {
        /// Payload length.
        len: usize,
        /// Configured maximum.
        limit: usize,
    },
}

impl ValidationError {
    /// Stable short name for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooSmall { .. } => "too_small",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

/// Pure size gate for [`AudioPayload`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioValidator {
    min_bytes: usize,
    max_bytes: usize,
}

impl Default for AudioValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BYTES, DEFAULT_MAX_BYTES)
    }
}

impl AudioValidator {
    /// Validator accepting payloads in `[min_bytes, max_bytes]`.
    ///
    /// `min_bytes` is raised to 1 so an empty payload is always rejected as
    /// [`ValidationError::Empty`], and lowered to `max_bytes` if inverted.
    pub fn new(min_bytes: usize, max_bytes: usize) -> Self {
        let max_bytes = max_bytes.max(1);
        Self {
            min_bytes: min_bytes.clamp(1, max_bytes),
            max_bytes,
        }
    }

    /// Validator from loaded settings.
    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(settings.min_bytes, settings.max_bytes)
    }

    /// Smallest accepted size.
    pub fn min_bytes(&self) -> usize {
        self.min_bytes
    }

    /// Largest accepted size.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check a payload.
    pub fn validate(&self, payload: &AudioPayload) -> Result<(), ValidationError> {
        self.validate_len(payload.len())
    }

    /// Check a raw length.
    pub fn validate_len(&self, len: usize) -> Result<(), ValidationError> {
        if len == 0 {
            Err(ValidationError::Empty)
        } else if len < self.min_bytes {
            Err(ValidationError::TooSmall {
                len,
                min: self.min_bytes,
            })
        } else if len > self.max_bytes {
            Err(ValidationError::TooLarge {
                len,
                limit: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    const KIB: usize = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
