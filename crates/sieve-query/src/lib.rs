//! Filter expression parsing for sieve.
//!
//! Turns SQL-flavored filter text into a predicate tree that backends can
//! translate into their own query form:
//!
//! - **Comparisons**: `age >= 18`, `status != 'closed'`
//! - **Ranges**: `age BETWEEN 18 AND 30`
//! - **Sets**: `tag IN ('a', 'b')`, `tag NOT IN ()`
//! - **Patterns**: `name LIKE '^Jo'`
//! - **Null tests**: `owner IS NOT NULL`
//! - **Grouping**: `NOT (a = 1 OR b = 2) AND c = 3`
//!
//! Conjunctions apply strictly left to right; parentheses are the only
//! precedence control. Quoted literals are opaque: nothing inside quotes is
//! ever read as structure.
//!
//! # Example
//!
//! ```
//! use sieve_query::parse;
//!
//! let tree = parse("name = 'A and B' AND age BETWEEN 18 AND 30").unwrap();
//! assert_eq!(
//!     tree.to_filter_string(),
//!     "name = 'A and B' AND age BETWEEN 18 AND 30"
//! );
//! ```

mod ast;
mod builder;
mod clause;
mod error;
mod guard;
mod literal;
mod parser;
mod splitter;

pub use ast::{CompareOp, Conjunction, FieldRef, PredicateNode};
pub use builder::build;
pub use clause::{parse_clause, sql_like_to_regex};
pub use error::QueryError;
pub use guard::{
    DEFAULT_MARKER_MAX_LEN, DEFAULT_QUOTES, Guarded, Replacements, guard, unguard, unquote,
};
pub use literal::{DateLiteralParser, IsoDateParser, Literal, parse_literal};
pub use parser::{FilterParser, LikeSyntax, ParseOptions, parse};
pub use splitter::{DEFAULT_MAX_DEPTH, SplitNode, split};
