//! Filter expression parser.
//!
//! Runs the pipeline end to end: quoting guard, structural splitter, clause
//! parser and tree builder.
//!
//! # Grammar
//!
//! ```text
//! expr    → element (("AND" | "OR") element)*
//! element → ["NOT"] "(" expr ")" | clause | ""
//! ```
//!
//! There is no operator precedence: conjunctions apply strictly left to
//! right, and parentheses are the only grouping. Empty elements are skipped.

use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, trace};

use crate::{
    ast::PredicateNode,
    builder::build,
    error::QueryError,
    guard::{DEFAULT_MARKER_MAX_LEN, DEFAULT_QUOTES, guard},
    literal::{DateLiteralParser, IsoDateParser},
    splitter::{DEFAULT_MAX_DEPTH, split},
};

/// How `LIKE` patterns are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LikeSyntax {
    /// The pattern is a regular expression, searched unanchored.
    #[default]
    Regex,
    /// SQL wildcards: `%` is any run, `_` is one character, the match is anchored.
    Sql,
}

/// Options controlling how filter text is parsed.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Characters that open and close quoted literals.
    pub quotes: Vec<char>,
    /// Maximum parenthesis nesting depth.
    pub max_depth: usize,
    /// Longest placeholder marker tried before giving up.
    pub placeholder_max_len: usize,
    /// `LIKE` pattern syntax.
    pub like: LikeSyntax,
    /// Date literal recognition.
    pub date_parser: Arc<dyn DateLiteralParser>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            quotes: DEFAULT_QUOTES.to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
            placeholder_max_len: DEFAULT_MARKER_MAX_LEN,
            like: LikeSyntax::default(),
            date_parser: Arc::new(IsoDateParser),
        }
    }
}

/// Parses filter text with fixed options, optionally memoizing results.
///
/// Successful parses are cached by input text and shared as `Arc`s; failures
/// are never cached. The parser is `Send + Sync` and can be shared freely.
#[derive(Debug, Clone)]
pub struct FilterParser {
    /// Parse options.
    options: ParseOptions,
    /// Memoized trees keyed by raw input.
    cache: Option<Cache<String, Arc<PredicateNode>>>,
}

impl Default for FilterParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl FilterParser {
    /// Creates a parser without a cache.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            cache: None,
        }
    }

    /// Creates a parser that memoizes up to `capacity` parsed trees.
    pub fn with_cache(options: ParseOptions, capacity: u64) -> Self {
        Self {
            options,
            cache: Some(Cache::new(capacity)),
        }
    }

    /// Returns the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses filter text into a predicate tree.
    ///
    /// Blank input is the always-true predicate.
    pub fn parse(&self, input: &str) -> Result<Arc<PredicateNode>, QueryError> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(input)
        {
            trace!(input, "filter cache hit");
            return Ok(hit);
        }

        let node = Arc::new(self.compile(input)?);
        if let Some(cache) = &self.cache {
            cache.insert(input.to_string(), Arc::clone(&node));
        }
        Ok(node)
    }

    /// Runs the full pipeline without touching the cache.
    fn compile(&self, input: &str) -> Result<PredicateNode, QueryError> {
        let options = &self.options;
        let guarded = guard(input, &options.quotes, options.placeholder_max_len)?;
        trace!(
            guarded = %guarded.text,
            marker = guarded.replacements.marker(),
            literals = guarded.replacements.len(),
            "guarded filter"
        );

        let nodes = split(&guarded.text, options.max_depth)?;
        let tree = build(&nodes, &guarded.replacements, options)?;
        debug!(input, filter = %tree.to_filter_string(), "parsed filter");
        Ok(tree)
    }
}

/// Parses filter text with default options.
///
/// ```
/// use sieve_query::{PredicateNode, parse};
///
/// let tree = parse("status = 'open' AND priority >= 2").unwrap();
/// assert!(matches!(tree, PredicateNode::BoolOp { .. }));
/// ```
pub fn parse(input: &str) -> Result<PredicateNode, QueryError> {
    FilterParser::default().compile(input)
}
