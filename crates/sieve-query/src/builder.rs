//! Predicate tree builder.
//!
//! Folds the splitter's sibling sequence into a predicate tree strictly left
//! to right: `a OR b AND c` is `(a OR b) AND c`. Runs of the same conjunction
//! flatten into one node. Empty clauses left by a dangling `AND`/`OR` are
//! dropped.

use crate::{
    ast::PredicateNode, clause::parse_clause, error::QueryError, guard::Replacements,
    parser::ParseOptions, splitter::SplitNode,
};

/// Builds a predicate tree from split siblings.
///
/// An empty sequence is the always-true predicate.
pub fn build(
    nodes: &[SplitNode],
    replacements: &Replacements,
    options: &ParseOptions,
) -> Result<PredicateNode, QueryError> {
    let mut result: Option<PredicateNode> = None;

    for node in nodes {
        if matches!(node, SplitNode::Clause { text, .. } if text.is_empty()) {
            continue;
        }
        let current = build_node(node, replacements, options)?;
        result = Some(match result {
            None => current,
            Some(previous) => PredicateNode::combine(node.conjunction(), vec![previous, current]),
        });
    }

    Ok(result.unwrap_or(PredicateNode::Constant(true)))
}

/// Builds one sibling: a clause becomes a leaf, a group recurses.
fn build_node(
    node: &SplitNode,
    replacements: &Replacements,
    options: &ParseOptions,
) -> Result<PredicateNode, QueryError> {
    match node {
        SplitNode::Clause { text, .. } => parse_clause(text, replacements, options),
        SplitNode::Group { negated, nodes, .. } => {
            let inner = build(nodes, replacements, options)?;
            Ok(if *negated {
                PredicateNode::not(inner)
            } else {
                inner
            })
        }
    }
}
