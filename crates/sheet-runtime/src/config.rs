#![forbid(unsafe_code)]

//! Sheet configuration as data.
//!
//! Loads a [`SheetConfig`] from TOML or JSON so an app can tune its sheets
//! without recompiling. Omitted fields keep their defaults. Every loaded
//! config is checked with [`SheetConfig::validate`].
//!
//! # Loading
//!
//! ```toml
//! initial_position = "collapsed"
//! header_inset_unit = 44.0
//!
//! [top_offset]
//! value = 0.0
//! include_safe_area = true
//!
//! [anchor.fraction]
//! value = 0.4
//! include_top_offset = true
//!
//! [preferred_animation.spring]
//! response = 0.3
//! damping_fraction = 0.85
//! blend_duration = 0.0
//! ```
//!
//! ```rust,ignore
//! let config = sheet_runtime::config::from_toml_file("sheet.toml")?;
//! let controller = SheetController::new(config);
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use sheet_core::engine::SheetConfig;
use thiserror::Error;

/// Errors from loading a [`SheetConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read sheet config: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("failed to parse sheet config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("failed to parse sheet config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sheet config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Validate `config`, turning problems into [`ConfigError::Validation`].
pub fn validated(config: SheetConfig) -> Result<SheetConfig, ConfigError> {
    let problems = config.validate();
    if problems.is_empty() {
        Ok(config)
    } else {
        tracing::warn!(count = problems.len(), "rejected sheet config");
        Err(ConfigError::Validation(problems))
    }
}

/// Load from a TOML string.
#[cfg(feature = "config")]
pub fn from_toml_str(s: &str) -> Result<SheetConfig, ConfigError> {
    validated(toml::from_str(s)?)
}

/// Load from a TOML file on disk.
#[cfg(feature = "config")]
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<SheetConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading sheet config");
    from_toml_str(&content)
}

/// Load from a JSON string.
#[cfg(feature = "config")]
pub fn from_json_str(s: &str) -> Result<SheetConfig, ConfigError> {
    validated(serde_json::from_str(s)?)
}

/// Load from a JSON file on disk.
#[cfg(feature = "config")]
pub fn from_json_file(path: impl AsRef<Path>) -> Result<SheetConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading sheet config");
    from_json_str(&content)
}

/// Load from `path`, picking the format by extension (`.json`, otherwise
/// TOML).
#[cfg(feature = "config")]
pub fn from_file(path: impl AsRef<Path>) -> Result<SheetConfig, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => from_json_file(path),
        _ => from_toml_file(path),
    }
}
