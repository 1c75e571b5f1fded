//! Panel settings and their optional TOML file.
//!
//! Every key is optional; a missing key takes its default, and a missing file
//! is the same as an empty one:
//!
//! ```toml
//! backend_url = "ws://192.168.4.1:8765/k922"
//! export_path = "k922_com1_config.json"
//! strict_import = false
//! log_level = "info"
//! ```
//!
//! Command-line flags override the file (see `main.rs`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use k922_core::DEFAULT_EXPORT_FILE_NAME;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime settings of the panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelSettings {
    /// Pre-fills the backend URL field at start-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    /// Where `export` writes when no path is given.
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    /// Validate imported files before applying them.
    #[serde(default)]
    pub strict_import: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_export_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_FILE_NAME)
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            backend_url: None,
            export_path: default_export_path(),
            strict_import: false,
            log_level: default_log_level(),
        }
    }
}

/// Loads settings from `path`, returning the defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<PanelSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PanelSettings::default()),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
