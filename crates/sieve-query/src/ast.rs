//! Predicate abstract syntax tree.
//!
//! The normalized tree every filter expression is parsed into, and the only
//! input the backend emitters accept.

use std::fmt;

use crate::literal::{Literal, escape_quoted};

/// A column or attribute reference, case-sensitive as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef(String);

impl FieldRef {
    /// Creates a field reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the field name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the name for filter text, backtick-quoting it when needed.
    fn to_filter_string(&self) -> String {
        let plain = self.0.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && self
                .0
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'));
        if plain {
            self.0.clone()
        } else {
            format!("`{}`", escape_quoted(&self.0, '`'))
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The keyword connecting sibling clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Conjunction {
    /// Returns the keyword spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
}

impl CompareOp {
    /// Returns the operator spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    /// Returns true for the ordering operators `>`, `<`, `>=`, `<=`.
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq | Self::NotEq)
    }
}

/// A node of the predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    /// Always true or always false (`1`, `true`, `0`, `false`, empty input).
    Constant(bool),

    /// `field op value`
    Comparison {
        /// Compared field.
        field: FieldRef,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand value.
        value: Literal,
    },

    /// `field [NOT] BETWEEN low AND high`, inclusive on both ends.
    Between {
        /// Tested field.
        field: FieldRef,
        /// Lower bound.
        low: Literal,
        /// Upper bound.
        high: Literal,
        /// True for `NOT BETWEEN`.
        negated: bool,
    },

    /// `field [NOT] IN (v1, v2, ...)`; an empty set never matches.
    InSet {
        /// Tested field.
        field: FieldRef,
        /// Candidate values in source order.
        values: Vec<Literal>,
        /// True for `NOT IN`.
        negated: bool,
    },

    /// `field [NOT] LIKE pattern`, where the pattern is a regular expression.
    Like {
        /// Tested field.
        field: FieldRef,
        /// Regular expression matched against the field value.
        pattern: String,
        /// True for `NOT LIKE`.
        negated: bool,
    },

    /// `field IS [NOT] NULL`
    IsNull {
        /// Tested field.
        field: FieldRef,
        /// True for `IS NOT NULL`.
        negated: bool,
    },

    /// Two or more children joined by one conjunction.
    BoolOp {
        /// The joining conjunction.
        op: Conjunction,
        /// Children in source order.
        children: Vec<Self>,
    },

    /// `NOT (...)`
    Not(Box<Self>),
}

impl PredicateNode {
    /// Joins children with AND, flattening nested ANDs and folding constants.
    pub fn and(children: Vec<Self>) -> Self {
        Self::combine(Conjunction::And, children)
    }

    /// Joins children with OR, flattening nested ORs and folding constants.
    pub fn or(children: Vec<Self>) -> Self {
        Self::combine(Conjunction::Or, children)
    }

    /// Joins children with `op`.
    ///
    /// The identity constant of `op` disappears, its absorbing constant wins,
    /// nested nodes with the same conjunction are spliced in, and a single
    /// remaining child is returned as-is.
    pub fn combine(op: Conjunction, children: Vec<Self>) -> Self {
        // AND: true is the identity, false absorbs; OR the other way round
        let identity = op == Conjunction::And;
        let mut flattened = Vec::with_capacity(children.len());

        for child in children {
            match child {
                Self::Constant(value) if value == identity => {}
                Self::Constant(value) => return Self::Constant(value),
                Self::BoolOp {
                    op: inner,
                    children,
                } if inner == op => flattened.extend(children),
                other => flattened.push(other),
            }
        }

        match flattened.len() {
            0 => Self::Constant(identity),
            1 => flattened.pop().unwrap_or(Self::Constant(identity)),
            _ => Self::BoolOp {
                op,
                children: flattened,
            },
        }
    }

    /// Negates a node, folding constants.
    pub fn not(child: Self) -> Self {
        match child {
            Self::Constant(value) => Self::Constant(!value),
            other => Self::Not(Box::new(other)),
        }
    }

    /// Returns true for nodes without child predicates.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::BoolOp { .. } | Self::Not(_))
    }

    /// Returns the field tested by a leaf node.
    pub fn field(&self) -> Option<&FieldRef> {
        match self {
            Self::Comparison { field, .. }
            | Self::Between { field, .. }
            | Self::InSet { field, .. }
            | Self::Like { field, .. }
            | Self::IsNull { field, .. } => Some(field),
            Self::Constant(_) | Self::BoolOp { .. } | Self::Not(_) => None,
        }
    }

    /// Returns every referenced field once, in first-seen order.
    pub fn fields(&self) -> Vec<&FieldRef> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    /// Depth-first helper for [`Self::fields`].
    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FieldRef>) {
        match self {
            Self::BoolOp { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            Self::Not(child) => child.collect_fields(out),
            leaf => {
                if let Some(field) = leaf.field()
                    && !out.contains(&field)
                {
                    out.push(field);
                }
            }
        }
    }

    /// Formats the node as an indented tree.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::BoolOp { op, children } => {
                writeln!(f, "{prefix}{op:?}")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Not(child) => {
                writeln!(f, "{prefix}Not")?;
                child.fmt_tree(f, indent + 1)
            }
            Self::Constant(value) => writeln!(f, "{prefix}Constant({value})"),
            leaf => writeln!(f, "{prefix}{}", leaf.leaf_to_string()),
        }
    }

    /// Renders the node back into filter-language text.
    ///
    /// Nested boolean groups are always parenthesized, so parsing the output
    /// yields a structurally equal tree (LIKE patterns are written as regular
    /// expressions).
    pub fn to_filter_string(&self) -> String {
        match self {
            Self::Constant(true) => "1".to_string(),
            Self::Constant(false) => "0".to_string(),
            Self::BoolOp { op, children } => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| match child {
                        Self::BoolOp { .. } => format!("({})", child.to_filter_string()),
                        _ => child.to_filter_string(),
                    })
                    .collect();
                parts.join(&format!(" {} ", op.keyword()))
            }
            Self::Not(child) => format!("NOT ({})", child.to_filter_string()),
            leaf => leaf.leaf_to_string(),
        }
    }

    /// Renders a leaf clause.
    fn leaf_to_string(&self) -> String {
        let not = |negated: bool| if negated { "NOT " } else { "" };
        match self {
            Self::Comparison { field, op, value } => {
                format!("{} {} {value}", field.to_filter_string(), op.symbol())
            }
            Self::Between {
                field,
                low,
                high,
                negated,
            } => format!(
                "{} {}BETWEEN {low} AND {high}",
                field.to_filter_string(),
                not(*negated)
            ),
            Self::InSet {
                field,
                values,
                negated,
            } => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!(
                    "{} {}IN ({})",
                    field.to_filter_string(),
                    not(*negated),
                    values.join(", ")
                )
            }
            Self::Like {
                field,
                pattern,
                negated,
            } => format!(
                "{} {}LIKE {}",
                field.to_filter_string(),
                not(*negated),
                Literal::String(pattern.clone())
            ),
            Self::IsNull { field, negated } => {
                format!("{} IS {}NULL", field.to_filter_string(), not(*negated))
            }
            Self::Constant(_) | Self::BoolOp { .. } | Self::Not(_) => self.to_filter_string(),
        }
    }
}

impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
