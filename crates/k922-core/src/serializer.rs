//! JSON text form of the configuration, and file export / import.
//!
//! Exported documents are pretty-printed with two-space indentation and keys
//! in declaration order, so a file written by one panel diffs cleanly against
//! a file written by another.
//!
//! Import is deliberately lenient: any syntactically valid JSON is accepted
//! and handed to [`apply`], which writes whatever it recognises.  Callers that
//! want the document checked first use [`import_str_strict`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::domain::config::{Configuration, InvalidField};
use crate::form::{apply, apply_config, collect, Form};

/// File name offered for exported configurations.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "k922_com1_config.json";

/// Errors from configuration serialization and file exchange.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid JSON.
    #[error("failed to parse configuration JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The configuration could not be turned into JSON.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Strict import: the document is not a complete K922 configuration.
    #[error("configuration does not match the K922 schema: {0}")]
    Schema(#[source] serde_json::Error),

    /// Strict import: a field lies outside its enumeration.
    #[error("configuration rejected: {0}")]
    Invalid(#[from] InvalidField),
}

/// Serializes a configuration as pretty JSON (two-space indentation).
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn to_json(cfg: &Configuration) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(cfg).map_err(ConfigError::Serialize)
}

/// Pretty-prints any JSON value the same way [`to_json`] does.
pub fn pretty(doc: &Value) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(doc).map_err(ConfigError::Serialize)
}

/// Parses configuration text without checking its shape.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `text` is not valid JSON.
pub fn from_json(text: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(text).map_err(ConfigError::Parse)
}

/// Collects the form and writes it to `path`.
///
/// Returns the written text so the caller can show it as a preview.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be written.
pub fn export_to_file(form: &Form, path: &Path) -> Result<String, ConfigError> {
    let json = to_json(&collect(form))?;
    std::fs::write(path, &json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("configuration exported to {}", path.display());
    Ok(json)
}

/// Parses `text` and applies it to the form.
///
/// Returns the document re-printed as pretty JSON for the preview.  On a parse
/// error the form is left untouched.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `text` is not valid JSON.
pub fn import_str(form: &mut Form, text: &str) -> Result<String, ConfigError> {
    let doc = from_json(text)?;
    let preview = pretty(&doc)?;
    apply(form, &doc);
    Ok(preview)
}

/// Like [`import_str`], but only applies a complete configuration whose
/// enum-valued fields all lie inside their enumerations.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for invalid JSON, [`ConfigError::Schema`]
/// for a document that is not a full configuration, and
/// [`ConfigError::Invalid`] for an out-of-range value.  The form is untouched
/// in every error case.
pub fn import_str_strict(form: &mut Form, text: &str) -> Result<String, ConfigError> {
    let doc = from_json(text)?;
    let cfg: Configuration = serde_json::from_value(doc).map_err(ConfigError::Schema)?;
    cfg.validate()?;
    let preview = to_json(&cfg)?;
    apply_config(form, &cfg);
    Ok(preview)
}

/// Reads a configuration file and applies it to the form.
///
/// With `strict` set the document is validated first (see
/// [`import_str_strict`]).  Returns the preview text.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, plus the errors of
/// the chosen import mode.  The form is untouched in every error case.
pub fn import_from_file(form: &mut Form, path: &Path, strict: bool) -> Result<String, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let preview = if strict {
        import_str_strict(form, &text)?
    } else {
        import_str(form, &text)?
    };
    info!("configuration imported from {}", path.display());
    Ok(preview)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
