//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use sieve_config::{Config, LikeMode, NegationMode};
use sieve_emit::{DocumentEmitter, NegationStyle};
use sieve_query::{FilterParser, LikeSyntax, ParseOptions, PredicateNode};
use tracing::debug;

use super::{args::ParserArgs, output::report_query_error};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        debug!(sources = config.sources.len(), "loaded configuration");
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is
    /// invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns parse options from configuration with CLI overrides applied.
    pub fn parse_options(&self, overrides: &ParserArgs) -> ParseOptions {
        let settings = &self.config.parser;
        let like = match overrides.like.unwrap_or(settings.like) {
            LikeMode::Regex => LikeSyntax::Regex,
            LikeMode::Sql => LikeSyntax::Sql,
        };
        ParseOptions {
            quotes: settings.quotes.clone(),
            max_depth: settings.max_depth,
            placeholder_max_len: settings.placeholder_max_len,
            like,
            ..ParseOptions::default()
        }
    }

    /// Builds a filter parser, cached when configuration enables it.
    pub fn parser(&self, overrides: &ParserArgs) -> FilterParser {
        let options = self.parse_options(overrides);
        let cache = &self.config.cache;
        if cache.enabled && !overrides.no_cache {
            FilterParser::with_cache(options, cache.capacity)
        } else {
            FilterParser::new(options)
        }
    }

    /// Parses a filter expression, printing the error and its hint on failure.
    pub fn parse_filter(
        &self,
        expr: &str,
        overrides: &ParserArgs,
    ) -> Result<Arc<PredicateNode>, ExitCode> {
        self.parser(overrides).parse(expr).map_err(|e| {
            report_query_error(&e);
            ExitCode::FAILURE
        })
    }

    /// Builds a document emitter; `force_nor` overrides the configured style.
    pub fn emitter(&self, force_nor: bool) -> DocumentEmitter {
        let style = match self.config.document.negation {
            _ if force_nor => NegationStyle::Nor,
            NegationMode::Not => NegationStyle::Not,
            NegationMode::Nor => NegationStyle::Nor,
        };
        DocumentEmitter::new(style)
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
