//! # bud-settings
//!
//! Layered configuration for the bud pipeline.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`BudSettings::default()`]
//! 2. **User file**: `~/.bud/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: credentials and `BUD_*` overrides (highest priority)
//!
//! Settings are read once at process start and passed down by reference;
//! there is no global cache.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path,
    load_settings_with_env, settings_path,
};
pub use types::*;
