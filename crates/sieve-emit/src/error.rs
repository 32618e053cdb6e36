//! Error types for predicate emission.

use thiserror::Error;

/// Errors raised while lowering a predicate tree into a backend form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A predicate references a field the row source does not have.
    #[error("unknown field `{field}`")]
    UnknownField {
        /// The missing field name.
        field: String,
    },

    /// An operator has no mapping in the target backend.
    #[error("unsupported operator `{operator}`: {reason}")]
    UnsupportedOperator {
        /// The operator as written in filter text.
        operator: String,
        /// Why the backend cannot express it.
        reason: String,
    },

    /// A `LIKE` pattern is not a valid regular expression.
    #[error("invalid LIKE pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },

    /// A JSON row cannot be loaded into a table.
    #[error("invalid row {index}: {message}")]
    InvalidRow {
        /// Zero-based row index.
        index: usize,
        /// What was wrong with the row.
        message: String,
    },
}

impl EmitError {
    /// Creates an unsupported-operator error for an ordering test against `NULL`.
    pub(crate) fn ordering_against_null(operator: &str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            reason: "ordering comparisons against NULL have no meaning; use IS [NOT] NULL"
                .to_string(),
        }
    }
}
