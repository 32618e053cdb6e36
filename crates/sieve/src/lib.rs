//! sieve: SQL-flavored filter expressions
//!
//! Parses `WHERE`-style filter text into a predicate tree and lowers it into a
//! MongoDB-style filter document or a boolean row mask over JSON data. The
//! `sieve` binary wraps the `sieve-query`, `sieve-emit` and `sieve-config` crates.

#![warn(missing_docs)]

pub mod cli;
