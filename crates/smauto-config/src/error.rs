// crates/smauto-config/src/error.rs
// ============================================================================
// Module: Model Loading Errors
// Description: Errors raised while reading and parsing a model file.
// Purpose: Distinguish I/O, parse, and semantic-validation failures
//          (`spec.md` §7 kind 1).
// Dependencies: smauto-core, thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised while loading a model from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file extension was neither `.toml` nor `.json`.
    #[error("unrecognized model file extension for {path} (expected .toml or .json)")]
    UnknownFormat {
        /// The path with the unrecognized extension.
        path: String,
    },
    /// The file's contents did not parse as TOML.
    #[error("failed to parse {path} as TOML: {source}")]
    Toml {
        /// The path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// The file's contents did not parse as JSON.
    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        /// The path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The parsed model failed semantic validation.
    #[error(transparent)]
    Invalid(#[from] smauto_core::ConfigError),
}
