//! Inbound audio payload and container format inference.

use bytes::Bytes;

/// Content types the upload surface is expected to send.
///
/// Anything else is still processed; callers log it as a warning.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "audio/webm",
    "audio/wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/x-wav",
    "audio/x-m4a",
    "audio/ogg",
];

/// Format token used when neither content type nor filename says anything useful.
pub const DEFAULT_FORMAT: &str = "webm";

/// Raw audio received at request ingress.
///
/// Immutable once built. `Bytes` makes clones cheap, so the payload can be
/// handed to an offloaded backend call without copying the audio.
#[derive(Clone, Debug)]
pub struct AudioPayload {
    bytes: Bytes,
    content_type: Option<String>,
    filename: Option<String>,
}

impl AudioPayload {
    /// Build a payload from raw bytes plus whatever metadata the caller has.
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: Option<String>,
        filename: Option<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.filter(|s| !s.trim().is_empty()),
            filename: filename.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Payload with no metadata.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, None, None)
    }

    /// Raw audio bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Declared MIME type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Original filename, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Whether the declared content type is one of [`ACCEPTED_CONTENT_TYPES`].
    ///
    /// A payload without a content type counts as accepted.
    pub fn has_accepted_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ACCEPTED_CONTENT_TYPES.contains(&mime_essence(ct).as_str()))
    }

    /// Infer the container format token.
    ///
    /// Content type wins when it maps to a known container, then the filename
    /// extension (lower-cased), then [`DEFAULT_FORMAT`].
    pub fn format_token(&self) -> String {
        if let Some(token) = self.content_type.as_deref().and_then(format_from_content_type) {
            return token.to_string();
        }
        self.filename
            .as_deref()
            .and_then(extension)
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
    }
}

/// Lower-cased MIME type without parameters (`audio/webm;codecs=opus` → `audio/webm`).
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn format_from_content_type(content_type: &str) -> Option<&'static str> {
    match mime_essence(content_type).as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/webm" | "video/webm" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/x-m4a" | "audio/mp4" | "audio/m4a" => Some("m4a"),
        _ => None,
    }
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
