//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`BudSettings::default()`]
//! 2. If `~/.bud/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. [`BudSettings::validate`] corrects out-of-range values
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::BudSettings;

/// Resolve the path to the settings file (`~/.bud/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".bud").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<BudSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<BudSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, reading overrides through `env`.
///
/// `env` maps a variable name to its value; tests pass a closure over a
/// fixed map instead of touching the process environment.
pub fn load_settings_with_env<F>(path: &Path, env: F) -> Result<BudSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(BudSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: BudSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate();
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// - Credentials: `GOOGLE_SPEECH_API_KEY`, `GOOGLE_SPEECH_ACCESS_TOKEN`, `GEMINI_API_KEY`
/// - Endpoints: `BUD_SPEECH_BASE_URL`, `BUD_GEMINI_BASE_URL`, `BUD_GEMINI_MODEL`
/// - Limits: `BUD_SPEECH_POOL_SIZE`, `BUD_MAX_AUDIO_BYTES`
/// - Logging: `BUD_LOG_LEVEL`, `BUD_LOG_JSON`
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides<F>(settings: &mut BudSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let reader = EnvReader { env };

    // ── Speech ──────────────────────────────────────────────────────
    if let Some(v) = reader.string("GOOGLE_SPEECH_API_KEY") {
        settings.speech.api_key = Some(v);
    }
    if let Some(v) = reader.string("GOOGLE_SPEECH_ACCESS_TOKEN") {
        settings.speech.access_token = Some(v);
    }
    if let Some(v) = reader.string("BUD_SPEECH_BASE_URL") {
        settings.speech.base_url = v;
    }
    if let Some(v) = reader.usize("BUD_SPEECH_POOL_SIZE", 1, 256) {
        settings.speech.worker_pool_size = v;
    }

    // ── Feedback ────────────────────────────────────────────────────
    if let Some(v) = reader.string("GEMINI_API_KEY") {
        settings.feedback.api_key = Some(v);
    }
    if let Some(v) = reader.string("BUD_GEMINI_BASE_URL") {
        settings.feedback.base_url = v;
    }
    if let Some(v) = reader.string("BUD_GEMINI_MODEL") {
        settings.feedback.model = v;
    }

    // ── Audio ───────────────────────────────────────────────────────
    if let Some(v) = reader.usize("BUD_MAX_AUDIO_BYTES", 1024, 1_073_741_824) {
        settings.audio.max_bytes = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = reader.string("BUD_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = reader.bool("BUD_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    env: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|v| !v.trim().is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.env)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.env)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;
    use crate::errors::SettingsError;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"speech": {"workerPoolSize": 4, "languageCode": "ja-JP"}});
        let source = serde_json::json!({"speech": {"workerPoolSize": 8}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["speech"]["workerPoolSize"], 8);
        assert_eq!(merged["speech"]["languageCode"], "ja-JP");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    // ── load_settings_with_env ──────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings =
            load_settings_with_env(Path::new("/nonexistent/settings.json"), no_env).unwrap();
        assert_eq!(settings.speech.worker_pool_size, 4);
        assert_eq!(settings.feedback.model, "gemini-2.5-flash");
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"feedback": {"model": "gemini-2.0-flash"}, "audio": {"maxBytes": 2048}}"#,
        )
        .unwrap();

        let settings = load_settings_with_env(&path, no_env).unwrap();
        assert_eq!(settings.feedback.model, "gemini-2.0-flash");
        assert_eq!(settings.audio.max_bytes, 2048);
        assert_eq!(settings.audio.min_bytes, 100);
        assert_eq!(settings.feedback.max_output_tokens, 300);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_with_env(&path, no_env);
        assert_matches!(result, Err(SettingsError::Json(_)));
    }

    #[test]
    fn load_runs_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"speech": {"lowConfidenceThreshold": 4.0}}"#).unwrap();

        let settings = load_settings_with_env(&path, no_env).unwrap();
        assert!((settings.speech.low_confidence_threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn env_overrides_beat_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"feedback": {"model": "from-file"}}"#).unwrap();

        let env = env_from(&[("BUD_GEMINI_MODEL", "from-env"), ("GEMINI_API_KEY", "AIza-env")]);
        let settings = load_settings_with_env(&path, env).unwrap();
        assert_eq!(settings.feedback.model, "from-env");
        assert_eq!(settings.feedback.api_key.as_deref(), Some("AIza-env"));
    }

    // ── apply_env_overrides ─────────────────────────────────────────

    #[test]
    fn env_credentials_applied() {
        let mut settings = BudSettings::default();
        apply_env_overrides(
            &mut settings,
            env_from(&[
                ("GOOGLE_SPEECH_API_KEY", "speech-key"),
                ("GOOGLE_SPEECH_ACCESS_TOKEN", "ya29.tok"),
            ]),
        );
        assert_eq!(settings.speech.api_key.as_deref(), Some("speech-key"));
        assert_eq!(settings.speech.access_token.as_deref(), Some("ya29.tok"));
    }

    #[test]
    fn env_empty_string_ignored() {
        let mut settings = BudSettings::default();
        apply_env_overrides(&mut settings, env_from(&[("GEMINI_API_KEY", "")]));
        assert!(settings.feedback.api_key.is_none());
    }

    #[test]
    fn env_invalid_pool_size_ignored() {
        let mut settings = BudSettings::default();
        apply_env_overrides(&mut settings, env_from(&[("BUD_SPEECH_POOL_SIZE", "0")]));
        assert_eq!(settings.speech.worker_pool_size, 4);
        apply_env_overrides(&mut settings, env_from(&[("BUD_SPEECH_POOL_SIZE", "many")]));
        assert_eq!(settings.speech.worker_pool_size, 4);
    }

    #[test]
    fn env_valid_pool_size_applied() {
        let mut settings = BudSettings::default();
        apply_env_overrides(&mut settings, env_from(&[("BUD_SPEECH_POOL_SIZE", "16")]));
        assert_eq!(settings.speech.worker_pool_size, 16);
    }

    #[test]
    fn env_logging_overrides() {
        let mut settings = BudSettings::default();
        apply_env_overrides(
            &mut settings,
            env_from(&[("BUD_LOG_LEVEL", "debug"), ("BUD_LOG_JSON", "yes")]),
        );
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
    }

    #[test]
    fn env_max_audio_bytes_range_checked() {
        let mut settings = BudSettings::default();
        apply_env_overrides(&mut settings, env_from(&[("BUD_MAX_AUDIO_BYTES", "12")]));
        assert_eq!(settings.audio.max_bytes, 10 * 1024 * 1024);
        apply_env_overrides(&mut settings, env_from(&[("BUD_MAX_AUDIO_BYTES", "4096")]));
        assert_eq!(settings.audio.max_bytes, 4096);
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in &["true", "1", "yes", "on", "TRUE", "On"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in &["false", "0", "no", "off", "FALSE"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_usize_range_bounds() {
        assert_eq!(parse_usize_range("50", 1, 100), Some(50));
        assert_eq!(parse_usize_range("0", 1, 100), None);
        assert_eq!(parse_usize_range("101", 1, 100), None);
        assert_eq!(parse_usize_range("x", 1, 100), None);
    }
}
