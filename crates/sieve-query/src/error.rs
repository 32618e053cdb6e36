//! Error types for filter parsing.
//!
//! Every failure while turning filter text into a predicate tree surfaces as a
//! [`QueryError`]. Syntax errors carry the offending fragment of the original
//! input so callers can point users at the problem.

use thiserror::Error;

/// Maximum number of characters of a fragment shown in error output.
const FRAGMENT_DISPLAY_LIMIT: usize = 60;

/// An error raised while parsing a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed input: unbalanced parentheses, an unrecognized clause shape,
    /// exceeded nesting depth, or an unterminated quote.
    #[error("filter syntax error: {message}{}", fragment_suffix(.fragment.as_deref()))]
    Syntax {
        /// Error message.
        message: String,
        /// The part of the input the error refers to, if known.
        fragment: Option<String>,
    },

    /// The quoting guard could not find a placeholder token absent from the input.
    #[error("no unused placeholder token of at most {max_len} characters is available")]
    PlaceholderExhausted {
        /// Longest placeholder marker that was tried.
        max_len: usize,
    },
}

/// Renders the fragment part of a syntax error message.
fn fragment_suffix(fragment: Option<&str>) -> String {
    match fragment {
        Some(text) if text.chars().count() > FRAGMENT_DISPLAY_LIMIT => {
            let head: String = text.chars().take(FRAGMENT_DISPLAY_LIMIT).collect();
            format!(" (in `{head}...`)")
        }
        Some(text) => format!(" (in `{text}`)"),
        None => String::new(),
    }
}

impl QueryError {
    /// Creates a syntax error without a fragment.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            fragment: None,
        }
    }

    /// Creates a syntax error pointing at a fragment of the input.
    pub fn syntax_at(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            fragment: Some(fragment.into()),
        }
    }

    /// Attaches a fragment to a syntax error that does not have one yet.
    pub fn or_fragment(self, fragment: impl Into<String>) -> Self {
        match self {
            Self::Syntax {
                message,
                fragment: None,
            } => Self::Syntax {
                message,
                fragment: Some(fragment.into()),
            },
            other => other,
        }
    }

    /// Returns the error message without the fragment.
    pub fn message(&self) -> String {
        match self {
            Self::Syntax { message, .. } => message.clone(),
            Self::PlaceholderExhausted { .. } => self.to_string(),
        }
    }

    /// Returns the offending fragment, if one was recorded.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Syntax { fragment, .. } => fragment.as_deref(),
            Self::PlaceholderExhausted { .. } => None,
        }
    }

    /// Returns true for syntax errors.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// Returns a suggestion for common mistakes.
    pub fn hint(&self) -> Option<&'static str> {
        let Self::Syntax { message, .. } = self else {
            return Some("Shorten the quoted literals or raise `placeholder_max_len`");
        };
        if message.contains("unclosed '('") {
            Some("Add a closing parenthesis ) to match the opening one")
        } else if message.contains("unexpected ')'") {
            Some("Remove the stray ) or add the matching (")
        } else if message.contains("unterminated quote") {
            Some("Close the quoted literal with the same quote character it starts with")
        } else if message.contains("BETWEEN") {
            Some("BETWEEN takes two bounds, e.g. `age BETWEEN 18 AND 30`")
        } else if message.contains("IN list") {
            Some("IN takes a parenthesized list, e.g. `x IN (1, 2, 3)`")
        } else if message.contains("not a field name") {
            Some("Quote field names with backticks or double quotes, e.g. `my field` = 1")
        } else if message.contains("max nesting exceeded") {
            Some("Flatten some of the nested parentheses")
        } else {
            None
        }
    }
}
