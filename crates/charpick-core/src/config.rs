//! Configuration types and loading for charpick.
//!
//! Configuration is loaded from `~/.config/charpick/config.toml`.
//!
//! # Error Handling
//!
//! - If the config file doesn't exist, default values are returned.
//! - If the config file exists but is invalid, an error is returned (fail fast).
//!
//! # Example Configuration
//!
//! ```toml
//! [selection]
//! rows = 4                    # selector rows shown
//!
//! [clipboard]
//! clear_after = 12            # seconds, 0 disables the auto-clear
//! always_clear = true         # also clear exports from unprotected fields
//!
//! [security]
//! seal_fields = true          # keep field values encrypted in memory
//!
//! [fields]
//! exclude = ["Title", "URL", "Notes"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Upper bound on selector rows.
pub const MAX_ROWS: usize = 16;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Selector configuration.
    pub selection: SelectionConfig,
    /// Clipboard configuration.
    pub clipboard: ClipboardConfig,
    /// Security configuration.
    pub security: SecurityConfig,
    /// Field filtering.
    pub fields: FieldsConfig,
}

/// Configuration for the selector rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of selector rows (default: 4, at most [`MAX_ROWS`]).
    pub rows: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { rows: 4 }
    }
}

/// Configuration for the clipboard sink.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Seconds until exported text is cleared (default: 12, 0 = never).
    pub clear_after: u64,
    /// Clear exports of unprotected fields as well (default: true).
    pub always_clear: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            clear_after: 12,
            always_clear: true,
        }
    }
}

/// Security-related configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Whether field values are AES-256-GCM sealed in memory.
    ///
    /// When enabled a value only exists in clear inside a locked scratch
    /// region while a single character is being read.
    pub seal_fields: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { seal_fields: true }
    }
}

/// Which host fields are offered.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Keys that are never offered (matched case-insensitively).
    pub exclude: Vec<String>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["Title".to_string(), "URL".to_string(), "Notes".to_string()],
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    ///
    /// Returns `~/.config/charpick/config.toml` using `dirs::config_dir()`,
    /// or `None` if the config directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("charpick").join("config.toml"))
    }

    /// Load configuration from the default path.
    ///
    /// - Returns `Ok(Config::default())` if no config file exists.
    /// - Returns `Err` if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the TOML types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.rows == 0 || self.selection.rows > MAX_ROWS {
            return Err(ConfigError::Invalid {
                key: "selection.rows",
                reason: format!("must be between 1 and {}", MAX_ROWS),
            });
        }
        Ok(())
    }

    /// How long an export stays on the clipboard, if it is cleared at all.
    ///
    /// Exports from protected fields are cleared whenever `clear_after` is
    /// non-zero; other exports only when `always_clear` is set.
    pub fn clear_after_for(&self, sensitive: bool) -> Option<Duration> {
        if self.clipboard.clear_after == 0 || !(sensitive || self.clipboard.always_clear) {
            None
        } else {
            Some(Duration::from_secs(self.clipboard.clear_after))
        }
    }

    /// Whether a host field key is excluded from the field list.
    pub fn is_excluded(&self, key: &str) -> bool {
        self.fields
            .exclude
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(key))
    }
}
