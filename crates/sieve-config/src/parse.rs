//! Configuration file parsing.
//!
//! Parses individual `.sieve.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::{ConfigError, LikeMode, NegationMode};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Filter parser section.
    pub parser: Option<RawParserSettings>,
    /// Parse cache section.
    pub cache: Option<RawCacheSettings>,
    /// Document emitter section.
    pub document: Option<RawDocumentSettings>,
}

/// Raw filter parser settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawParserSettings {
    /// Quote characters, as a single string or an array of strings.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub quotes: Option<Vec<String>>,
    /// Maximum parenthesis nesting depth.
    pub max_depth: Option<usize>,
    /// Longest placeholder marker to try.
    pub placeholder_max_len: Option<usize>,
    /// `LIKE` pattern syntax.
    pub like: Option<LikeMode>,
}

/// Raw parse cache settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCacheSettings {
    /// Whether parsed filters are memoized.
    pub enabled: Option<bool>,
    /// Maximum number of memoized filters.
    pub capacity: Option<u64>,
}

/// Raw document emitter settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDocumentSettings {
    /// How `NOT (...)` groups are written.
    pub negation: Option<NegationMode>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
///
/// Useful for validating template content (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Just the `root` flag; every other key is ignored.
#[derive(Deserialize)]
struct RootFlag {
    /// The file's `root` setting.
    #[serde(default)]
    root: bool,
}

/// Checks if a config file has `root = true` set.
///
/// Only the flag itself is read, so a root file with a bad setting elsewhere
/// still ends discovery. Returns false if the file is not readable TOML.
pub fn is_root_config(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| toml::from_str::<RootFlag>(&contents).ok())
        .is_some_and(|flag| flag.root)
}
