//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules.

use std::path::{Path, PathBuf};

use crate::{
    CacheSettings, Config, ConfigError, DocumentSettings, ParserSettings,
    parse::{RawCacheSettings, RawConfig, RawDocumentSettings, RawParserSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Each setting takes the first defined value.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // Lowest precedence first, so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.parser {
            apply_raw_parser(&mut config.parser, raw, &parsed.path)?;
        }
        if let Some(ref raw) = parsed.config.cache {
            apply_raw_cache(&mut config.cache, raw);
        }
        if let Some(ref raw) = parsed.config.document {
            apply_raw_document(&mut config.document, raw);
        }
    }

    config.config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);
    config.sources = configs.iter().map(|c| c.path.clone()).collect();
    Ok(config)
}

/// Applies raw parser settings, overwriting any present values.
fn apply_raw_parser(
    result: &mut ParserSettings,
    raw: &RawParserSettings,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref quotes) = raw.quotes {
        result.quotes = quotes
            .iter()
            .map(|q| single_char(q, path))
            .collect::<Result<_, _>>()?;
    }
    if let Some(v) = raw.max_depth {
        result.max_depth = v;
    }
    if let Some(v) = raw.placeholder_max_len {
        result.placeholder_max_len = v;
    }
    if let Some(v) = raw.like {
        result.like = v;
    }
    Ok(())
}

/// Applies raw cache settings.
fn apply_raw_cache(result: &mut CacheSettings, raw: &RawCacheSettings) {
    if let Some(v) = raw.enabled {
        result.enabled = v;
    }
    if let Some(v) = raw.capacity {
        result.capacity = v;
    }
}

/// Applies raw document settings.
fn apply_raw_document(result: &mut DocumentSettings, raw: &RawDocumentSettings) {
    if let Some(v) = raw.negation {
        result.negation = v;
    }
}

/// Converts a one-character string into that character.
fn single_char(value: &str, path: &Path) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidQuote {
            path: path.to_path_buf(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LikeMode, NegationMode, parse::parse_config_str};

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty() {
        let config = merge_configs(&[]).unwrap();
        assert_eq!(config.parser, ParserSettings::default());
        assert!(config.config_root.is_none());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_closest_value_wins() {
        let configs = [
            parsed("/p/a/.sieve.toml", "[parser]\nmax_depth = 8\n"),
            parsed(
                "/p/.sieve.toml",
                "[parser]\nmax_depth = 32\nlike = \"sql\"\n[document]\nnegation = \"nor\"\n",
            ),
        ];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.parser.max_depth, 8);
        assert_eq!(config.parser.like, LikeMode::Sql);
        assert_eq!(config.document.negation, NegationMode::Nor);
        assert_eq!(config.config_root, Some(PathBuf::from("/p/a")));
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_unset_values_keep_defaults() {
        let config = merge_configs(&[parsed("/p/.sieve.toml", "[cache]\ncapacity = 7\n")]).unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, 7);
        assert_eq!(config.parser.quotes, vec!['\'', '"', '`']);
    }

    #[test]
    fn test_quotes_replace_not_extend() {
        let configs = [
            parsed("/p/a/.sieve.toml", "[parser]\nquotes = \"'\"\n"),
            parsed("/p/.sieve.toml", "[parser]\nquotes = [\"`\", \"\\\"\"]\n"),
        ];
        assert_eq!(merge_configs(&configs).unwrap().parser.quotes, vec!['\'']);
    }

    #[test]
    fn test_multi_char_quote_is_an_error() {
        let err = merge_configs(&[parsed("/p/.sieve.toml", "[parser]\nquotes = [\"''\"]\n")])
            .unwrap_err();
        let ConfigError::InvalidQuote { value, .. } = &err else {
            panic!("expected an invalid quote error, got {err:?}");
        };
        assert_eq!(value, "''");
    }
}
