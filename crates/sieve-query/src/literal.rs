//! Literal values.
//!
//! Values on the right-hand side of a clause are resolved by an explicit
//! grammar: quoted strings, `NULL`/`NONE`, booleans, integers, floats and
//! date-times. Nothing is ever evaluated as code.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    error::QueryError,
    guard::{Replacements, unquote},
};

/// Layout used when rendering date literals back into filter text.
///
/// `%.f` prints nothing for whole seconds.
const DATE_TIME_DISPLAY: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Date-time layouts accepted after the leading `YYYY-M-D` shape check.
const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Date-time layouts carrying a `Z` or numeric offset; values convert to UTC.
const ZONED_DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

/// A resolved scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `NULL` or `NONE`.
    Null,
    /// `TRUE` or `FALSE`.
    Bool(bool),
    /// A whole number.
    Integer(i64),
    /// A decimal or exponent number.
    Float(f64),
    /// Quoted text, or a single bare word that is no other literal.
    String(String),
    /// A date or date-time, without time zone. Zoned input is stored as UTC.
    Date(NaiveDateTime),
}

impl Literal {
    /// Returns true for `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string payload, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps the decimal point, so the text parses back as a float
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "'{}'", escape_quoted(s, '\'')),
            Self::Date(dt) => write!(f, "{}", dt.format(DATE_TIME_DISPLAY)),
        }
    }
}

/// Escapes backslashes and the given quote character.
pub(crate) fn escape_quoted(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\\' || ch == quote {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Recognizes date literals in unquoted value text.
///
/// Date recognition is a seam: callers with their own date conventions plug
/// in a different implementation through `ParseOptions`.
pub trait DateLiteralParser: Send + Sync + fmt::Debug {
    /// Returns the date-time denoted by `text`, or `None` if it is not a date.
    fn parse_date(&self, text: &str) -> Option<NaiveDateTime>;
}

/// ISO-like dates: `YYYY-M-D`, optionally followed by ` H:M:S` or `THH:MM:SS`
/// with optional fractional seconds and an optional `Z` or `+HH:MM` offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateParser;

impl DateLiteralParser for IsoDateParser {
    fn parse_date(&self, text: &str) -> Option<NaiveDateTime> {
        let bytes = text.as_bytes();
        if bytes.len() < 8 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        DATE_TIME_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
            .or_else(|| {
                ZONED_DATE_TIME_LAYOUTS.iter().find_map(|layout| {
                    DateTime::parse_from_str(text, layout)
                        .ok()
                        .map(|dt| dt.naive_utc())
                })
            })
    }
}

/// Resolves unquoted or placeholder value text into a literal.
///
/// `text` is the value part of a clause in guarded form, with whitespace
/// between words collapsed to single spaces.
pub fn parse_literal(
    text: &str,
    replacements: &Replacements,
    dates: &dyn DateLiteralParser,
) -> Result<Literal, QueryError> {
    if text.is_empty() {
        return Err(QueryError::syntax("missing value"));
    }

    if let Some(quoted) = replacements.get(text) {
        return Ok(Literal::String(unquote(quoted)));
    }
    if replacements.touches(text) {
        return Err(QueryError::syntax(
            "quoted literal must stand alone as a value",
        ));
    }

    if text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("none") {
        return Ok(Literal::Null);
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(Literal::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Literal::Bool(false));
    }
    if let Some(number) = parse_number(text) {
        return Ok(number);
    }
    if let Some(date) = dates.parse_date(text) {
        return Ok(Literal::Date(date));
    }
    if text.contains(char::is_whitespace) {
        return Err(QueryError::syntax(format!(
            "unrecognized value `{text}` (quote text that contains spaces)"
        )));
    }
    Ok(Literal::String(text.to_string()))
}

/// Parses integer and float spellings; `inf`/`nan` words are not numbers.
fn parse_number(text: &str) -> Option<Literal> {
    let numeric_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !numeric_chars || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Literal::Integer(n));
    }
    text.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(Literal::Float)
}
