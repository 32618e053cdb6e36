//! Structural splitter.
//!
//! Walks guarded filter text left to right, tracking parenthesis depth. At
//! depth 0 the text is cut at `AND`/`OR` keywords into sibling clauses; a
//! parenthesized span that starts a clause (optionally after `NOT`) becomes a
//! group whose content is split recursively. Parentheses that appear after a
//! clause has started, such as an `IN (...)` list, stay part of the clause.
//!
//! The `AND` inside `x BETWEEN 1 AND 2` belongs to the clause and is never
//! treated as a connective. A connective with nothing on one side (`a = 1 AND`)
//! leaves an empty clause, which the builder drops.

use crate::{ast::Conjunction, error::QueryError};

/// Default maximum group nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One element of a split expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitNode {
    /// An atomic clause, still in guarded form.
    Clause {
        /// Conjunction joining this clause to the previous sibling
        /// (`And` for the first sibling).
        conjunction: Conjunction,
        /// The clause text, trimmed.
        text: String,
    },

    /// A parenthesized group.
    Group {
        /// Conjunction joining this group to the previous sibling
        /// (`And` for the first sibling).
        conjunction: Conjunction,
        /// True for `NOT (...)`.
        negated: bool,
        /// The group's split content.
        nodes: Vec<Self>,
    },
}

impl SplitNode {
    /// Returns the conjunction joining this node to its previous sibling.
    pub fn conjunction(&self) -> Conjunction {
        match self {
            Self::Clause { conjunction, .. } | Self::Group { conjunction, .. } => *conjunction,
        }
    }
}

/// Splits guarded text into sibling clauses and groups.
///
/// Returns an empty sequence for blank input. Fails on unbalanced
/// parentheses, empty groups, text glued to a group, and nesting deeper than
/// `max_depth`.
pub fn split(guarded: &str, max_depth: usize) -> Result<Vec<SplitNode>, QueryError> {
    Splitter { max_depth }.split_level(guarded, 0)
}

/// Keywords the splitter reacts to at depth 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    /// A boolean connective.
    Connective(Conjunction),
    /// `BETWEEN`, which claims the next `AND`.
    Between,
}

/// Splitting state shared across recursion levels.
struct Splitter {
    /// Maximum group nesting depth.
    max_depth: usize,
}

/// Accumulates the siblings of one nesting level.
struct Level {
    /// Finished siblings.
    nodes: Vec<SplitNode>,
    /// Conjunction read since the last sibling, if any.
    pending: Option<Conjunction>,
    /// Text of the clause being read.
    current: String,
    /// True right after a group closed, until the next conjunction.
    after_group: bool,
    /// True between a `BETWEEN` keyword and its `AND`.
    between_open: bool,
}

impl Level {
    /// Creates an empty level.
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            pending: None,
            current: String::new(),
            after_group: false,
            between_open: false,
        }
    }

    /// Takes the conjunction for the next sibling.
    fn take_conjunction(&mut self) -> Conjunction {
        self.pending.take().unwrap_or(Conjunction::And)
    }

    /// Closes the clause being read before a conjunction or the end.
    ///
    /// A missing clause is recorded with empty text.
    fn finish_clause(&mut self) -> Result<(), QueryError> {
        let text = self.current.trim().to_string();
        if self.after_group {
            if !text.is_empty() {
                return Err(QueryError::syntax_at(
                    "expected AND or OR after a parenthesized group",
                    text,
                ));
            }
        } else {
            let clause = SplitNode::Clause {
                conjunction: self.take_conjunction(),
                text,
            };
            self.nodes.push(clause);
        }
        self.current.clear();
        self.after_group = false;
        self.between_open = false;
        Ok(())
    }
}

impl Splitter {
    /// Splits one nesting level.
    fn split_level(&self, text: &str, depth: usize) -> Result<Vec<SplitNode>, QueryError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut level = Level::new();
        let mut pos = 0;

        while let Some(ch) = text[pos..].chars().next() {
            match ch {
                '(' => {
                    let close = matching_paren(text, pos)?;
                    let head = level.current.trim();
                    if head.is_empty() || head.eq_ignore_ascii_case("not") {
                        if level.after_group {
                            return Err(QueryError::syntax_at(
                                "expected AND or OR between parenthesized groups",
                                text[pos..=close].to_string(),
                            ));
                        }
                        let negated = !head.is_empty();
                        let group = self.group(&text[pos..=close], depth)?;
                        let conjunction = level.take_conjunction();
                        level.nodes.push(SplitNode::Group {
                            conjunction,
                            negated,
                            nodes: group,
                        });
                        level.current.clear();
                        level.after_group = true;
                    } else {
                        level.current.push_str(&text[pos..=close]);
                    }
                    pos = close + 1;
                }
                ')' => {
                    return Err(QueryError::syntax_at(
                        "unbalanced parentheses: unexpected ')'",
                        text[..=pos].to_string(),
                    ));
                }
                _ => {
                    if let Some((keyword, end)) = keyword_at(text, pos) {
                        match keyword {
                            Keyword::Connective(Conjunction::And) if level.between_open => {
                                level.between_open = false;
                                level.current.push_str(&text[pos..end]);
                            }
                            Keyword::Connective(conj) => {
                                level.finish_clause()?;
                                level.pending = Some(conj);
                            }
                            Keyword::Between => {
                                level.between_open = true;
                                level.current.push_str(&text[pos..end]);
                            }
                        }
                        pos = end;
                        continue;
                    }
                    level.current.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }

        if level.after_group && level.current.trim().is_empty() {
            return Ok(level.nodes);
        }
        level.finish_clause()?;
        Ok(level.nodes)
    }

    /// Splits the content of a group span, parentheses included.
    fn group(&self, span: &str, depth: usize) -> Result<Vec<SplitNode>, QueryError> {
        if depth + 1 > self.max_depth {
            return Err(QueryError::syntax_at(
                "max nesting exceeded",
                span.to_string(),
            ));
        }
        let inner = &span[1..span.len() - 1];
        let nodes = self.split_level(inner, depth + 1)?;
        if nodes.is_empty() {
            return Err(QueryError::syntax_at(
                "empty parenthesized group",
                span.to_string(),
            ));
        }
        Ok(nodes)
    }
}

/// Returns the byte index of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Result<usize, QueryError> {
    let mut depth = 0usize;
    for (offset, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(QueryError::syntax_at(
        "unbalanced parentheses: unclosed '('",
        text[open..].to_string(),
    ))
}

/// Recognizes a keyword starting at `pos` on a word boundary.
///
/// Returns the keyword and the byte index just past it.
fn keyword_at(text: &str, pos: usize) -> Option<(Keyword, usize)> {
    let boundary_before = text[..pos]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || c == ')');
    if !boundary_before {
        return None;
    }

    let word_len = text[pos..]
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let end = pos + word_len;
    let boundary_after = text[end..]
        .chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || c == '(');
    if word_len == 0 || !boundary_after {
        return None;
    }

    let word = &text[pos..end];
    let keyword = if word.eq_ignore_ascii_case("and") {
        Keyword::Connective(Conjunction::And)
    } else if word.eq_ignore_ascii_case("or") {
        Keyword::Connective(Conjunction::Or)
    } else if word.eq_ignore_ascii_case("between") {
        Keyword::Between
    } else {
        return None;
    };
    Some((keyword, end))
}
