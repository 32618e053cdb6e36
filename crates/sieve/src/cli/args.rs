//! Clap argument definitions for the `sieve` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sieve_config::LikeMode;

/// Parse a `LIKE` syntax name from a string.
fn parse_like(s: &str) -> Result<LikeMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "regex" => Ok(LikeMode::Regex),
        "sql" => Ok(LikeMode::Sql),
        other => Err(format!("unknown LIKE syntax '{other}' (use regex or sql)")),
    }
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "SQL-flavored filters for document queries and row masks")]
#[command(version)]
pub struct Cli {
    /// Verbosity level (-v for debug logs, -vv for trace)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared flags that override parser settings from configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ParserArgs {
    /// LIKE pattern syntax: regex (unanchored search) or sql (% and _ wildcards)
    #[arg(long, value_parser = parse_like)]
    pub like: Option<LikeMode>,

    /// Skip the parse cache for this invocation
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for `sieve parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Filter expression
    pub expr: String,

    /// Print the normalized filter text instead of the tree
    #[arg(long)]
    pub canonical: bool,

    #[command(flatten)]
    /// Parser setting overrides.
    pub parser: ParserArgs,
}

/// Arguments for `sieve mongo`.
#[derive(Args, Debug, Clone)]
pub struct MongoCommand {
    /// Filter expression
    pub expr: String,

    /// Wrap the filter in an aggregation pipeline `[{"$match": ...}]`
    #[arg(long)]
    pub pipeline: bool,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,

    /// Write NOT groups as `$nor` instead of `$not`
    #[arg(long)]
    pub nor: bool,

    #[command(flatten)]
    /// Parser setting overrides.
    pub parser: ParserArgs,
}

/// Arguments for `sieve filter`.
#[derive(Args, Debug, Clone)]
pub struct FilterCommand {
    /// Filter expression
    pub expr: String,

    /// JSON file holding an array of row objects, or `-` for stdin
    pub file: PathBuf,

    /// Print the boolean mask, one value per row
    #[arg(long, conflicts_with = "json")]
    pub mask: bool,

    /// Print matching rows as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    /// Parser setting overrides.
    pub parser: ParserArgs,
}

/// Arguments for `sieve init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.sieve.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `sieve` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a filter expression and print its predicate tree
    #[command(after_help = "\
FILTER SYNTAX:
  a = 1, a != 1, a < 1 ...      Comparisons (=, ==, !=, <>, <, <=, >, >=)
  a BETWEEN 1 AND 5             Inclusive range
  a IN (1, 2, 3)                Membership
  a LIKE '^ab'                  Pattern match
  a IS NULL, a IS NOT NULL      Null tests
  x AND y, x OR y               Evaluated left to right, no precedence
  NOT (x), (x)                  Negated and plain groups
  'text', \"text\", `field name`  Quoted literals and field names

EXAMPLES:
  sieve parse \"a = 1 AND (b IN (2, 3) OR c LIKE 'x')\"
  sieve parse --canonical \"NOT (d > 2022-01-03)\"")]
    Parse(ParseCommand),

    /// Translate a filter expression into a MongoDB-style filter document
    Mongo(MongoCommand),

    /// Evaluate a filter expression over JSON rows
    Filter(FilterCommand),

    /// Initialize sieve configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,
}
