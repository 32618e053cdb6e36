//! Columnar row sources.
//!
//! The mask emitter reads data one column at a time through [`RowSource`].
//! [`Table`] is the in-memory implementation, loaded from JSON objects.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{DateTime, NaiveDateTime, SecondsFormat};
use serde_json::{Map, Value as JsonValue};
use sieve_query::Literal;

use crate::error::EmitError;

/// Extended-JSON key marking a date value.
pub const DATE_KEY: &str = "$date";

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON `null`, or a key the row does not have.
    Null,
    /// A boolean.
    Bool(bool),
    /// A whole number.
    Int(i64),
    /// A non-integral or out-of-range number.
    Float(f64),
    /// A string.
    String(String),
    /// A date-time, in UTC.
    Date(NaiveDateTime),
}

impl Value {
    /// Converts a JSON scalar (or `{"$date": "..."}` object) into a cell.
    pub fn from_json(json: &JsonValue) -> Result<Self, String> {
        Ok(match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?),
            },
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Object(object) => Self::Date(parse_date_object(object)?),
            JsonValue::Array(_) => return Err("array values are not supported".to_string()),
        })
    }

    /// Converts the cell back into JSON.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(x) => JsonValue::from(*x),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Date(dt) => date_to_json(dt),
        }
    }

    /// Returns true for null cells.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality against a literal, with integers and floats compared numerically.
    pub fn matches(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (Self::Null, Literal::Null) => true,
            _ => self.compare(literal) == Some(Ordering::Equal),
        }
    }

    /// Orders the cell against a literal of the same type class.
    ///
    /// Returns `None` for nulls and for values of different classes, which
    /// never satisfy an ordering test.
    pub fn compare(&self, literal: &Literal) -> Option<Ordering> {
        match (self, literal) {
            (Self::Bool(a), Literal::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Literal::Integer(b)) => Some(a.cmp(b)),
            (Self::Int(a), Literal::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Literal::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Literal::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Literal::String(b)) => Some(a.as_str().cmp(b.as_str())),
            (Self::Date(a), Literal::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Renders a date-time as an extended-JSON date object.
pub fn date_to_json(dt: &NaiveDateTime) -> JsonValue {
    let mut object = Map::new();
    object.insert(
        DATE_KEY.to_string(),
        JsonValue::String(dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    JsonValue::Object(object)
}

/// Parses a `{"$date": "<RFC 3339>"}` object into a UTC date-time.
fn parse_date_object(object: &Map<String, JsonValue>) -> Result<NaiveDateTime, String> {
    match (object.len(), object.get(DATE_KEY)) {
        (1, Some(JsonValue::String(text))) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .map_err(|e| format!("invalid date `{text}`: {e}")),
        _ => Err("only {\"$date\": \"...\"} objects are supported".into()),
    }
}

/// Read access to columnar data.
pub trait RowSource {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Returns the cells of a column, one per row, or `None` if the column does not exist.
    fn column(&self, name: &str) -> Option<&[Value]>;
}

/// An in-memory columnar table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Number of rows.
    rows: usize,
    /// Columns by name, each `rows` cells long.
    columns: BTreeMap<String, Vec<Value>>,
}

impl Table {
    /// Builds a table from JSON objects.
    ///
    /// Every key seen in any row becomes a column; rows without the key hold
    /// a null cell there.
    pub fn from_json_rows(rows: &[JsonValue]) -> Result<Self, EmitError> {
        let mut table = Self {
            rows: rows.len(),
            columns: BTreeMap::new(),
        };

        for (index, row) in rows.iter().enumerate() {
            let JsonValue::Object(object) = row else {
                return Err(EmitError::InvalidRow {
                    index,
                    message: "expected a JSON object".to_string(),
                });
            };
            for (key, json) in object {
                let value = Value::from_json(json)
                    .map_err(|message| EmitError::InvalidRow { index, message })?;
                let column = table
                    .columns
                    .entry(key.clone())
                    .or_insert_with(|| vec![Value::Null; rows.len()]);
                column[index] = value;
            }
        }

        Ok(table)
    }

    /// Adds or replaces a column.
    ///
    /// Fails if the column length differs from the table's row count.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        cells: Vec<Value>,
    ) -> Result<Self, EmitError> {
        if self.columns.is_empty() && self.rows == 0 {
            self.rows = cells.len();
        }
        if cells.len() != self.rows {
            return Err(EmitError::InvalidRow {
                index: cells.len().min(self.rows),
                message: format!(
                    "column has {} cells but the table has {} rows",
                    cells.len(),
                    self.rows
                ),
            });
        }
        self.columns.insert(name.into(), cells);
        Ok(self)
    }

    /// Returns the column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Renders one row as a JSON object; null cells are included.
    pub fn row_json(&self, index: usize) -> Option<JsonValue> {
        if index >= self.rows {
            return None;
        }
        let object = self
            .columns
            .iter()
            .map(|(name, cells)| (name.clone(), cells[index].to_json()))
            .collect();
        Some(JsonValue::Object(object))
    }
}

impl RowSource for Table {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}
