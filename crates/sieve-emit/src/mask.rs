//! Vectorized predicate emitter.
//!
//! Evaluates a predicate tree against a columnar [`RowSource`], producing one
//! boolean per row. Children are evaluated column-at-a-time and combined
//! elementwise; a conjunction stops early once its running mask is all-false
//! (AND) or all-true (OR).
//!
//! Null semantics follow the document store: null and missing cells satisfy
//! `IS NULL`, `!=`, every negated form and `IN (..., NULL)`, and nothing
//! else.

use std::{cmp::Ordering, collections::HashMap};

use regex::Regex;
use sieve_query::{CompareOp, Conjunction, FieldRef, Literal, PredicateNode};
use tracing::debug;

use crate::{
    error::EmitError,
    table::{RowSource, Value},
};

/// Evaluates a predicate tree into a row mask.
///
/// Every field is checked against the source and every pattern compiled
/// before any column is scanned.
pub fn to_mask<S>(node: &PredicateNode, source: &S) -> Result<Vec<bool>, EmitError>
where
    S: RowSource + ?Sized,
{
    let mut patterns = HashMap::new();
    prepare(node, source, &mut patterns)?;

    let evaluator = Evaluator { source, patterns };
    let mask = evaluator.eval(node)?;
    debug!(
        rows = mask.len(),
        matched = mask.iter().filter(|&&m| m).count(),
        "evaluated mask"
    );
    Ok(mask)
}

/// Validates fields and operators, compiling `LIKE` patterns.
fn prepare<S>(
    node: &PredicateNode,
    source: &S,
    patterns: &mut HashMap<String, Regex>,
) -> Result<(), EmitError>
where
    S: RowSource + ?Sized,
{
    match node {
        PredicateNode::Constant(_) => return Ok(()),
        PredicateNode::BoolOp { children, .. } => {
            for child in children {
                prepare(child, source, patterns)?;
            }
            return Ok(());
        }
        PredicateNode::Not(child) => return prepare(child, source, patterns),
        PredicateNode::Comparison {
            op,
            value: Literal::Null,
            ..
        } if op.is_ordering() => return Err(EmitError::ordering_against_null(op.symbol())),
        PredicateNode::Between { low, high, .. } if low.is_null() || high.is_null() => {
            return Err(EmitError::ordering_against_null("BETWEEN"));
        }
        PredicateNode::Like { pattern, .. } if !patterns.contains_key(pattern) => {
            let regex = Regex::new(pattern).map_err(|e| EmitError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            patterns.insert(pattern.clone(), regex);
        }
        _ => {}
    }

    if let Some(field) = node.field() {
        column(source, field)?;
    }
    Ok(())
}

/// Looks up a column, failing on unknown fields.
fn column<'a, S>(source: &'a S, field: &FieldRef) -> Result<&'a [Value], EmitError>
where
    S: RowSource + ?Sized,
{
    source
        .column(field.as_str())
        .ok_or_else(|| EmitError::UnknownField {
            field: field.as_str().to_string(),
        })
}

/// Mask evaluation over a validated tree.
struct Evaluator<'a, S: ?Sized> {
    /// The data being filtered.
    source: &'a S,
    /// Compiled `LIKE` patterns by source text.
    patterns: HashMap<String, Regex>,
}

impl<S> Evaluator<'_, S>
where
    S: RowSource + ?Sized,
{
    /// Computes the mask for one node.
    fn eval(&self, node: &PredicateNode) -> Result<Vec<bool>, EmitError> {
        let rows = self.source.row_count();
        Ok(match node {
            PredicateNode::Constant(value) => vec![*value; rows],
            PredicateNode::BoolOp { op, children } => self.eval_bool_op(*op, children)?,
            PredicateNode::Not(child) => self.eval(child)?.into_iter().map(|m| !m).collect(),
            PredicateNode::Comparison { field, op, value } => {
                let op = *op;
                self.map_cells(field, false, |cell| compare_cell(cell, op, value))?
            }
            PredicateNode::Between {
                field,
                low,
                high,
                negated,
            } => self.map_cells(field, *negated, |cell| {
                matches!(cell.compare(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cell.compare(high), Some(Ordering::Less | Ordering::Equal))
            })?,
            PredicateNode::InSet {
                field,
                values,
                negated,
            } => self.map_cells(field, *negated, |cell| {
                values.iter().any(|value| cell.matches(value))
            })?,
            PredicateNode::Like {
                field,
                pattern,
                negated,
            } => {
                let regex = self
                    .patterns
                    .get(pattern)
                    .ok_or_else(|| EmitError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: "pattern was not compiled".to_string(),
                    })?;
                self.map_cells(field, *negated, |cell| match cell {
                    Value::String(s) => regex.is_match(s),
                    _ => false,
                })?
            }
            PredicateNode::IsNull { field, negated } => {
                self.map_cells(field, *negated, Value::is_null)?
            }
        })
    }

    /// Combines child masks, stopping once the result can no longer change.
    fn eval_bool_op(
        &self,
        op: Conjunction,
        children: &[PredicateNode],
    ) -> Result<Vec<bool>, EmitError> {
        let absorbing = op == Conjunction::Or;
        let mut mask = vec![!absorbing; self.source.row_count()];

        for child in children {
            if mask.iter().all(|&m| m == absorbing) {
                break;
            }
            let child_mask = self.eval(child)?;
            for (m, c) in mask.iter_mut().zip(child_mask) {
                *m = match op {
                    Conjunction::And => *m && c,
                    Conjunction::Or => *m || c,
                };
            }
        }
        Ok(mask)
    }

    /// Applies a cell test down a column, inverting it when `negated`.
    fn map_cells(
        &self,
        field: &FieldRef,
        negated: bool,
        test: impl Fn(&Value) -> bool,
    ) -> Result<Vec<bool>, EmitError> {
        let cells = column(self.source, field)?;
        Ok(cells.iter().map(|cell| test(cell) != negated).collect())
    }
}

/// Tests one cell against a comparison.
fn compare_cell(cell: &Value, op: CompareOp, value: &Literal) -> bool {
    match op {
        CompareOp::Eq => cell.matches(value),
        CompareOp::NotEq => !cell.matches(value),
        CompareOp::Gt => cell.compare(value) == Some(Ordering::Greater),
        CompareOp::Lt => cell.compare(value) == Some(Ordering::Less),
        CompareOp::Gte => matches!(
            cell.compare(value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Lte => matches!(cell.compare(value), Some(Ordering::Less | Ordering::Equal)),
    }
}
