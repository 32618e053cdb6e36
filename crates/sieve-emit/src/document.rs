//! Document-store query emitter.
//!
//! Lowers a predicate tree into a MongoDB-style filter document:
//!
//! | Predicate                | Document                                   |
//! |--------------------------|--------------------------------------------|
//! | `a = v`                  | `{"a": v}`                                 |
//! | `a != v`, `a > v`, ...   | `{"a": {"$ne": v}}`, `{"a": {"$gt": v}}`   |
//! | `a BETWEEN x AND y`      | `{"a": {"$gte": x, "$lte": y}}`            |
//! | `a IN (...)`             | `{"a": {"$in": [...]}}` (`$nin` negated)   |
//! | `a LIKE p`               | `{"a": {"$regex": p}}`                     |
//! | `a IS NULL`              | `{"a": null}` (`{"$ne": null}` negated)    |
//! | `x AND y`, `x OR y`      | `{"$and": [...]}`, `{"$or": [...]}`        |
//! | `NOT (x)`                | `{"$not": x}` or `{"$nor": [x]}`           |
//!
//! Negated leaves wrap their operator document in a field-level `$not`.

use serde_json::{Map, Value as JsonValue, json};
use sieve_query::{CompareOp, Conjunction, FieldRef, Literal, PredicateNode};
use tracing::debug;

use crate::{error::EmitError, table::date_to_json};

/// How `NOT (...)` groups are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegationStyle {
    /// `{"$not": child}`.
    #[default]
    Not,
    /// `{"$nor": [child]}`, accepted at the top level of a filter.
    Nor,
}

/// Emits filter documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEmitter {
    /// Negation style for `NOT (...)` groups.
    negation: NegationStyle,
}

impl DocumentEmitter {
    /// Creates an emitter with the given negation style.
    pub fn new(negation: NegationStyle) -> Self {
        Self { negation }
    }

    /// Lowers a predicate tree into a filter document.
    pub fn emit(&self, node: &PredicateNode) -> Result<JsonValue, EmitError> {
        let doc = self.emit_node(node)?;
        debug!(filter = %node.to_filter_string(), "emitted document query");
        Ok(doc)
    }

    /// Wraps the filter document in a `$match` aggregation stage.
    ///
    /// Returns `None` for an always-true filter, which needs no stage.
    pub fn match_stage(&self, node: &PredicateNode) -> Result<Option<JsonValue>, EmitError> {
        if matches!(node, PredicateNode::Constant(true)) {
            return Ok(None);
        }
        Ok(Some(json!({ "$match": self.emit(node)? })))
    }

    /// Lowers one node.
    fn emit_node(&self, node: &PredicateNode) -> Result<JsonValue, EmitError> {
        Ok(match node {
            PredicateNode::Constant(true) => json!({}),
            PredicateNode::Constant(false) => json!({ "$expr": false }),
            PredicateNode::BoolOp { op, children } => {
                let key = match op {
                    Conjunction::And => "$and",
                    Conjunction::Or => "$or",
                };
                let children = children
                    .iter()
                    .map(|child| self.emit_node(child))
                    .collect::<Result<Vec<_>, _>>()?;
                json!({ key: children })
            }
            PredicateNode::Not(child) => {
                let child = self.emit_node(child)?;
                match self.negation {
                    NegationStyle::Not => json!({ "$not": child }),
                    NegationStyle::Nor => json!({ "$nor": [child] }),
                }
            }
            PredicateNode::Comparison { field, op, value } => emit_comparison(field, *op, value)?,
            PredicateNode::Between {
                field,
                low,
                high,
                negated,
            } => {
                if low.is_null() || high.is_null() {
                    return Err(EmitError::ordering_against_null("BETWEEN"));
                }
                let range = json!({
                    "$gte": literal_to_json(low),
                    "$lte": literal_to_json(high),
                });
                field_doc(field, negate_if(range, *negated))
            }
            PredicateNode::InSet {
                field,
                values,
                negated,
            } => {
                let key = if *negated { "$nin" } else { "$in" };
                let values: Vec<JsonValue> = values.iter().map(literal_to_json).collect();
                field_doc(field, json!({ key: values }))
            }
            PredicateNode::Like {
                field,
                pattern,
                negated,
            } => field_doc(field, negate_if(json!({ "$regex": pattern }), *negated)),
            PredicateNode::IsNull { field, negated } => {
                let test = if *negated {
                    json!({ "$ne": null })
                } else {
                    JsonValue::Null
                };
                field_doc(field, test)
            }
        })
    }
}

/// Lowers a comparison; equality is written as the bare value.
fn emit_comparison(
    field: &FieldRef,
    op: CompareOp,
    value: &Literal,
) -> Result<JsonValue, EmitError> {
    if op.is_ordering() && value.is_null() {
        return Err(EmitError::ordering_against_null(op.symbol()));
    }
    let value = literal_to_json(value);
    let test = match op {
        CompareOp::Eq => value,
        CompareOp::NotEq => json!({ "$ne": value }),
        CompareOp::Gt => json!({ "$gt": value }),
        CompareOp::Lt => json!({ "$lt": value }),
        CompareOp::Gte => json!({ "$gte": value }),
        CompareOp::Lte => json!({ "$lte": value }),
    };
    Ok(field_doc(field, test))
}

/// Builds `{field: test}`.
fn field_doc(field: &FieldRef, test: JsonValue) -> JsonValue {
    let mut doc = Map::new();
    doc.insert(field.as_str().to_string(), test);
    JsonValue::Object(doc)
}

/// Wraps an operator document in a field-level `$not` when `negated`.
fn negate_if(operators: JsonValue, negated: bool) -> JsonValue {
    if negated {
        json!({ "$not": operators })
    } else {
        operators
    }
}

/// Converts a literal into its JSON form; dates use extended JSON.
pub fn literal_to_json(literal: &Literal) -> JsonValue {
    match literal {
        Literal::Null => JsonValue::Null,
        Literal::Bool(b) => JsonValue::Bool(*b),
        Literal::Integer(n) => JsonValue::from(*n),
        Literal::Float(x) => JsonValue::from(*x),
        Literal::String(s) => JsonValue::String(s.clone()),
        Literal::Date(dt) => date_to_json(dt),
    }
}

/// Lowers a predicate tree into a filter document with `$not` negation.
pub fn to_query_doc(node: &PredicateNode) -> Result<JsonValue, EmitError> {
    DocumentEmitter::default().emit(node)
}

/// Wraps the filter document in a `$match` stage, or `None` if always true.
pub fn to_match_stage(node: &PredicateNode) -> Result<Option<JsonValue>, EmitError> {
    DocumentEmitter::default().match_stage(node)
}
