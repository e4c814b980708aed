//! Error types for preset loading, blending and generation
//!
//! Only fatal conditions live here. Per-parameter blend failures and
//! per-file catalog skips are reported as values (`ParameterOutcome::Skipped`,
//! `LoadSkip`) so an in-progress blend or load can finish with the valid data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a load, blend or generation
#[derive(Debug, Error)]
pub enum PresetError {
    /// Document is unparsable or lacks required structure
    #[error("Malformed preset '{source_name}': {reason}")]
    MalformedRecord { source_name: String, reason: String },

    /// Fewer than two factory presets in the requested bucket
    #[error("Not enough presets in category '{category}', condition '{condition}' (found {found}, need 2)")]
    InsufficientSources {
        category: String,
        condition: String,
        found: usize,
    },

    /// Category has no default template in its user bucket
    #[error("Default preset not found: {0}")]
    MissingTemplate(PathBuf),

    /// Weight vector rejected by the N-way blend
    #[error("Invalid blend weights: {0}")]
    InvalidWeights(String),

    /// N-way blend called with too few or too many sources
    #[error("Weighted blend needs 2 to 4 sources, got {found}")]
    SourceCount { found: usize },

    /// Presets root directory does not exist
    #[error("Presets root not found: {0}")]
    RootNotFound(PathBuf),

    /// XML reader/writer error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error during scanning, reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PresetError {
    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for preset operations
pub type PresetResult<T> = Result<T, PresetError>;
