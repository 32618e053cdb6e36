//! Error types for sieve configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A quote entry is not exactly one character.
    #[error("invalid quote {value:?} in {path}: quotes must be single characters")]
    InvalidQuote {
        /// Path to the offending file.
        path: PathBuf,
        /// The rejected entry.
        value: String,
    },

    /// Failed to render settings as TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ser::Error),
}
