//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that
//! load fine but make filters fail or behave surprisingly.

use std::fmt;

use crate::Config;

/// Characters the filter grammar already gives a meaning.
const STRUCTURAL_CHARS: &[char] = &['(', ')', ',', '=', '!', '<', '>', '\\'];

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A quote character is alphanumeric, whitespace or part of the grammar.
    UnusableQuote {
        /// The offending character.
        quote: char,
    },
    /// No quote characters are configured, so values cannot contain spaces.
    NoQuotes,
    /// `max_depth = 0` rejects every parenthesized group.
    ZeroMaxDepth,
    /// `placeholder_max_len = 0` rejects every quoted literal.
    ZeroPlaceholderLen,
    /// Caching is enabled with room for nothing.
    ZeroCacheCapacity,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusableQuote { quote } => {
                write!(f, "quote character {quote:?} conflicts with filter syntax")
            }
            Self::NoQuotes => write!(f, "no quote characters configured"),
            Self::ZeroMaxDepth => {
                write!(f, "parser.max_depth = 0 rejects all parenthesized groups")
            }
            Self::ZeroPlaceholderLen => write!(
                f,
                "parser.placeholder_max_len = 0 rejects all quoted literals"
            ),
            Self::ZeroCacheCapacity => write!(f, "cache is enabled but cache.capacity is 0"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let parser = &config.parser;

    if parser.quotes.is_empty() {
        warnings.push(ConfigWarning::NoQuotes);
    }
    for &quote in &parser.quotes {
        if quote.is_alphanumeric() || quote.is_whitespace() || STRUCTURAL_CHARS.contains(&quote)
        {
            warnings.push(ConfigWarning::UnusableQuote { quote });
        }
    }
    if parser.max_depth == 0 {
        warnings.push(ConfigWarning::ZeroMaxDepth);
    }
    if parser.placeholder_max_len == 0 {
        warnings.push(ConfigWarning::ZeroPlaceholderLen);
    }
    if config.cache.enabled && config.cache.capacity == 0 {
        warnings.push(ConfigWarning::ZeroCacheCapacity);
    }

    warnings
}
