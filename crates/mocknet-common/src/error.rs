//! Unified error type for the mocknet workspace.
//!
//! Every failure surfaced by the configuration pipeline — file access,
//! document decoding, schema violations, reference and identity conflicts —
//! is a [`ConfigError`]. Errors abort resolution entirely; there is no
//! partial or degraded result.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A document could not be decoded.
    #[error("malformed document {file}: {message}")]
    Parse {
        /// Description of the decode failure.
        message: String,
        /// File that failed to decode.
        file: PathBuf,
    },

    /// A document field is missing, has the wrong shape, or an invalid value.
    #[error("invalid configuration in {file}: {message}")]
    Schema {
        /// Description of the invalid field.
        message: String,
        /// File containing the invalid field.
        file: PathBuf,
    },

    /// The declared schema version is not supported.
    #[error("unsupported config version {version} in {file}")]
    UnsupportedVersion {
        /// Version the document declared.
        version: i64,
        /// File that declared it.
        file: PathBuf,
    },

    /// A referenced entity does not exist in the loaded graph.
    #[error("{kind} not found: '{name}' ({detail})")]
    NotFound {
        /// Type of the missing entity.
        kind: &'static str,
        /// Name of the missing entity.
        name: String,
        /// Which entity required it and where it was declared.
        detail: String,
    },

    /// Two entities with the same name were defined incompatibly.
    #[error("duplicate {kind} '{name}': {detail}")]
    Conflict {
        /// Type of the conflicting entity.
        kind: &'static str,
        /// Shared name of both definitions.
        name: String,
        /// The conflicting definitions and their declaring files.
        detail: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ConfigError>;
