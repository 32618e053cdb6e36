//! Configuration system for sieve.
//!
//! sieve uses TOML configuration files named `.sieve.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.sieve.toml` files found, then loading `~/.sieve.toml` as the global config with lowest
//! precedence.

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawCacheSettings, RawConfig, RawDocumentSettings, RawParserSettings, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
use sieve_query::{DEFAULT_MARKER_MAX_LEN, DEFAULT_MAX_DEPTH, DEFAULT_QUOTES};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for sieve.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.sieve.toml` files according to precedence rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Filter parser settings.
    pub parser: ParserSettings,
    /// Parse cache settings.
    pub cache: CacheSettings,
    /// Document emitter settings.
    pub document: DocumentSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Files that contributed, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sieve.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in `.sieve.toml` layout.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            parser: &self.parser,
            cache: &self.cache,
            document: &self.document,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// How `LIKE` patterns are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeMode {
    /// Regular expression, searched unanchored.
    #[default]
    Regex,
    /// SQL `%` and `_` wildcards, matched against the whole value.
    Sql,
}

/// How `NOT (...)` groups are written in filter documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NegationMode {
    /// `{"$not": ...}`.
    #[default]
    Not,
    /// `{"$nor": [...]}`.
    Nor,
}

/// Filter parser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserSettings {
    /// Characters that open and close quoted literals.
    pub quotes: Vec<char>,
    /// Maximum parenthesis nesting depth.
    pub max_depth: usize,
    /// Longest placeholder marker to try.
    pub placeholder_max_len: usize,
    /// `LIKE` pattern syntax.
    pub like: LikeMode,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            quotes: DEFAULT_QUOTES.to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
            placeholder_max_len: DEFAULT_MARKER_MAX_LEN,
            like: LikeMode::Regex,
        }
    }
}

/// Parse cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSettings {
    /// Whether parsed filters are memoized.
    pub enabled: bool,
    /// Maximum number of memoized filters.
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 1024,
        }
    }
}

/// Document emitter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSettings {
    /// How `NOT (...)` groups are written.
    pub negation: NegationMode,
}

/// Borrowed view of the settings sections for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Filter parser settings.
    parser: &'a ParserSettings,
    /// Parse cache settings.
    cache: &'a CacheSettings,
    /// Document emitter settings.
    document: &'a DocumentSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_settings_defaults() {
        let parser = ParserSettings::default();
        assert_eq!(parser.quotes, DEFAULT_QUOTES);
        assert_eq!(parser.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(parser.placeholder_max_len, DEFAULT_MARKER_MAX_LEN);
        assert_eq!(parser.like, LikeMode::Regex);
    }

    #[test]
    fn test_cache_and_document_defaults() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, 1024);
        assert_eq!(config.document.negation, NegationMode::Not);
        assert!(config.config_root.is_none());
    }

    #[test]
    fn test_settings_to_toml() {
        let toml = Config::default().settings_to_toml().unwrap();

        assert!(toml.contains("[parser]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[document]"));
        assert!(toml.contains("max_depth = 64"));
        assert!(toml.contains("like = \"regex\""));
        assert!(toml.contains("negation = \"not\""));
    }

    #[test]
    fn test_settings_to_toml_round_trips() {
        let mut config = Config::default();
        config.parser.like = LikeMode::Sql;
        config.parser.quotes = vec!['\''];
        config.cache.capacity = 3;

        let toml = config.settings_to_toml().unwrap();
        let raw = parse_config_str(&toml, Path::new("effective.toml")).unwrap();
        let reparsed = merge_configs(&[ParsedConfig {
            path: PathBuf::from("/x/.sieve.toml"),
            config: raw,
        }])
        .unwrap();

        assert_eq!(reparsed.parser, config.parser);
        assert_eq!(reparsed.cache, config.cache);
        assert_eq!(reparsed.document, config.document);
    }
}
