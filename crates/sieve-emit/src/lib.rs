//! Backends for sieve predicate trees.
//!
//! Two emitters lower a parsed [`PredicateNode`](sieve_query::PredicateNode):
//!
//! - [`to_query_doc`] builds a MongoDB-style filter document.
//! - [`to_mask`] evaluates the predicate over columnar data, one boolean per row.
//!
//! Both agree on every row of the same data: null and missing values, type
//! classes and pattern matching follow document-store semantics in the mask
//! emitter too.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sieve_emit::{Table, to_mask, to_query_doc};
//!
//! let tree = sieve_query::parse("x in (1, 2, 3)").unwrap();
//! assert_eq!(to_query_doc(&tree).unwrap(), json!({"x": {"$in": [1, 2, 3]}}));
//!
//! let table = Table::from_json_rows(&[json!({"x": 1}), json!({"x": 4})]).unwrap();
//! assert_eq!(to_mask(&tree, &table).unwrap(), vec![true, false]);
//! ```

mod document;
mod error;
mod mask;
mod table;

pub use document::{DocumentEmitter, NegationStyle, literal_to_json, to_match_stage, to_query_doc};
pub use error::EmitError;
pub use mask::to_mask;
pub use table::{DATE_KEY, RowSource, Table, Value, date_to_json};
