//! Clause unit parser.
//!
//! Parses one atomic clause, already isolated by the splitter and still in
//! guarded form, into a leaf of the predicate tree.
//!
//! # Grammar
//!
//! ```text
//! clause  → "1" | "TRUE" | "0" | "FALSE"
//!         | field "IS" ["NOT"] "NULL"
//!         | field ["NOT"] "BETWEEN" value "AND" value
//!         | field ["NOT"] "IN" "(" [value ("," value)*] ")"
//!         | field ["NOT"] "LIKE" value
//!         | field op value
//! op      → "=" | "==" | "!=" | "<>" | ">" | "<" | ">=" | "<="
//! ```

use std::{iter::Peekable, str::Chars};

use crate::{
    ast::{CompareOp, FieldRef, PredicateNode},
    error::QueryError,
    guard::{Replacements, unguard, unquote},
    literal::{DateLiteralParser, Literal, parse_literal},
    parser::{LikeSyntax, ParseOptions},
};

/// Characters that end a word inside a clause.
const WORD_DELIMITERS: &[char] = &['(', ')', ',', '=', '!', '<', '>'];

/// A token inside a clause.
#[derive(Debug, Clone, PartialEq)]
enum ClauseToken {
    /// A field name, keyword, value word or placeholder.
    Word(String),
    /// A comparison operator.
    Op(CompareOp),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
}

impl ClauseToken {
    /// Returns true if this is the given keyword (case-insensitive).
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

/// Splits clause text into tokens.
struct ClauseLexer<'a> {
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
}

impl<'a> ClauseLexer<'a> {
    /// Creates a lexer over clause text.
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    /// Tokenizes the whole clause.
    fn tokenize(mut self) -> Result<Vec<ClauseToken>, QueryError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Returns the next token, or `None` at the end of the clause.
    fn next_token(&mut self) -> Result<Option<ClauseToken>, QueryError> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(ch) = self.chars.next() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => ClauseToken::LParen,
            ')' => ClauseToken::RParen,
            ',' => ClauseToken::Comma,
            '=' => {
                self.chars.next_if_eq(&'=');
                ClauseToken::Op(CompareOp::Eq)
            }
            '!' => {
                if self.chars.next_if_eq(&'=').is_none() {
                    return Err(QueryError::syntax("expected '=' after '!'"));
                }
                ClauseToken::Op(CompareOp::NotEq)
            }
            '<' => match self.chars.next_if(|&c| c == '=' || c == '>') {
                Some('=') => ClauseToken::Op(CompareOp::Lte),
                Some(_) => ClauseToken::Op(CompareOp::NotEq),
                None => ClauseToken::Op(CompareOp::Lt),
            },
            '>' => {
                if self.chars.next_if_eq(&'=').is_some() {
                    ClauseToken::Op(CompareOp::Gte)
                } else {
                    ClauseToken::Op(CompareOp::Gt)
                }
            }
            first => {
                let mut word = String::from(first);
                while let Some(c) = self
                    .chars
                    .next_if(|c| !c.is_whitespace() && !WORD_DELIMITERS.contains(c))
                {
                    word.push(c);
                }
                ClauseToken::Word(word)
            }
        };
        Ok(Some(token))
    }
}

/// Parses guarded clause text into a leaf predicate.
///
/// Errors carry the clause in its original, unguarded spelling.
pub fn parse_clause(
    text: &str,
    replacements: &Replacements,
    options: &ParseOptions,
) -> Result<PredicateNode, QueryError> {
    let result = ClauseLexer::new(text)
        .tokenize()
        .and_then(|tokens| ClauseParser::new(tokens, replacements, options).parse());
    result.map_err(|err| err.or_fragment(unguard(text.trim(), replacements)))
}

/// Recursive descent over the tokens of a single clause.
struct ClauseParser<'a> {
    /// Clause tokens.
    tokens: Vec<ClauseToken>,
    /// Current position in `tokens`.
    position: usize,
    /// Placeholder mapping for quoted literals.
    replacements: &'a Replacements,
    /// Parser options (LIKE syntax, date recognition).
    options: &'a ParseOptions,
}

impl<'a> ClauseParser<'a> {
    /// Creates a parser over clause tokens.
    fn new(
        tokens: Vec<ClauseToken>,
        replacements: &'a Replacements,
        options: &'a ParseOptions,
    ) -> Self {
        Self {
            tokens,
            position: 0,
            replacements,
            options,
        }
    }

    /// Parses the clause.
    fn parse(mut self) -> Result<PredicateNode, QueryError> {
        match self.tokens.as_slice() {
            [] => return Ok(PredicateNode::Constant(true)),
            [ClauseToken::Word(word)] if word == "1" || word.eq_ignore_ascii_case("true") => {
                return Ok(PredicateNode::Constant(true));
            }
            [ClauseToken::Word(word)] if word == "0" || word.eq_ignore_ascii_case("false") => {
                return Ok(PredicateNode::Constant(false));
            }
            _ => {}
        }

        let field = self.parse_field()?;

        let Some(token) = self.advance() else {
            return Err(QueryError::syntax(format!(
                "expected an operator after field `{field}`"
            )));
        };

        let node = match token {
            ClauseToken::Op(op) => self.parse_comparison(field, op)?,
            word if word.is_keyword("is") => self.parse_is_null(field)?,
            word if word.is_keyword("not") => match self.advance() {
                Some(next) => self.parse_keyword_operator(field, &next, true)?,
                None => {
                    return Err(QueryError::syntax("expected BETWEEN, IN or LIKE after NOT"));
                }
            },
            other => self.parse_keyword_operator(field, &other, false)?,
        };

        if let Some(extra) = self.peek() {
            return Err(QueryError::syntax(format!(
                "unexpected {} at end of clause",
                describe(extra)
            )));
        }
        Ok(node)
    }

    /// Parses the leading field name, resolving backtick or double-quoted names.
    fn parse_field(&mut self) -> Result<FieldRef, QueryError> {
        let Some(ClauseToken::Word(word)) = self.advance() else {
            return Err(QueryError::syntax("expected a field name"));
        };

        if let Some(quoted) = self.replacements.get(&word) {
            if quoted.starts_with('\'') {
                return Err(QueryError::syntax(format!(
                    "{quoted} is a string literal, not a field name"
                )));
            }
            let name = unquote(quoted);
            if name.is_empty() {
                return Err(QueryError::syntax("empty field name"));
            }
            return Ok(FieldRef::new(name));
        }

        let valid_start = word
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if !valid_start || self.replacements.touches(&word) {
            return Err(QueryError::syntax(format!(
                "expected a field name, found `{}`",
                unguard(&word, self.replacements)
            )));
        }
        Ok(FieldRef::new(word))
    }

    /// Parses `BETWEEN`, `IN` or `LIKE` after the field (and an optional `NOT`).
    fn parse_keyword_operator(
        &mut self,
        field: FieldRef,
        keyword: &ClauseToken,
        negated: bool,
    ) -> Result<PredicateNode, QueryError> {
        if keyword.is_keyword("between") {
            self.parse_between(field, negated)
        } else if keyword.is_keyword("in") {
            self.parse_in(field, negated)
        } else if keyword.is_keyword("like") {
            self.parse_like(field, negated)
        } else if negated {
            Err(QueryError::syntax("expected BETWEEN, IN or LIKE after NOT"))
        } else {
            Err(QueryError::syntax(format!(
                "unrecognized clause: expected an operator after field `{field}`, found {}",
                describe(keyword)
            )))
        }
    }

    /// Parses `op value`; `= NULL` and `!= NULL` become null tests.
    fn parse_comparison(
        &mut self,
        field: FieldRef,
        op: CompareOp,
    ) -> Result<PredicateNode, QueryError> {
        let value = self.parse_value(|_| false)?;
        Ok(match (op, value) {
            (CompareOp::Eq, Literal::Null) => PredicateNode::IsNull {
                field,
                negated: false,
            },
            (CompareOp::NotEq, Literal::Null) => PredicateNode::IsNull {
                field,
                negated: true,
            },
            (op, value) => PredicateNode::Comparison { field, op, value },
        })
    }

    /// Parses `IS [NOT] NULL` after the `IS`.
    fn parse_is_null(&mut self, field: FieldRef) -> Result<PredicateNode, QueryError> {
        let negated = self.peek().is_some_and(|t| t.is_keyword("not"));
        if negated {
            self.advance();
        }
        match self.advance() {
            Some(t) if t.is_keyword("null") || t.is_keyword("none") => {
                Ok(PredicateNode::IsNull { field, negated })
            }
            _ => Err(QueryError::syntax("expected NULL after IS")),
        }
    }

    /// Parses `low AND high` after `BETWEEN`.
    fn parse_between(
        &mut self,
        field: FieldRef,
        negated: bool,
    ) -> Result<PredicateNode, QueryError> {
        let shape_error = || QueryError::syntax("BETWEEN requires `low AND high`");
        let low = self
            .parse_value(|t| t.is_keyword("and"))
            .map_err(|_| shape_error())?;
        if !self.advance().is_some_and(|t| t.is_keyword("and")) {
            return Err(shape_error());
        }
        let high = self.parse_value(|_| false).map_err(|_| shape_error())?;
        Ok(PredicateNode::Between {
            field,
            low,
            high,
            negated,
        })
    }

    /// Parses `( v1, v2, ... )` after `IN`; the list may be empty.
    fn parse_in(&mut self, field: FieldRef, negated: bool) -> Result<PredicateNode, QueryError> {
        if self.advance() != Some(ClauseToken::LParen) {
            return Err(QueryError::syntax("IN list must be parenthesized"));
        }

        let mut values = Vec::new();
        if self.peek() == Some(&ClauseToken::RParen) {
            self.advance();
        } else {
            loop {
                let value = self
                    .parse_value(|t| matches!(t, ClauseToken::Comma | ClauseToken::RParen))
                    .map_err(|err| match err {
                        QueryError::Syntax { message, .. } if message == "missing value" => {
                            QueryError::syntax("empty value in IN list")
                        }
                        other => other,
                    })?;
                values.push(value);
                match self.advance() {
                    Some(ClauseToken::Comma) => {}
                    Some(ClauseToken::RParen) => break,
                    _ => return Err(QueryError::syntax("unclosed IN list")),
                }
            }
        }

        Ok(PredicateNode::InSet {
            field,
            values,
            negated,
        })
    }

    /// Parses the pattern after `LIKE`, translating SQL wildcards if configured.
    fn parse_like(&mut self, field: FieldRef, negated: bool) -> Result<PredicateNode, QueryError> {
        let Literal::String(pattern) = self.parse_value(|_| false)? else {
            return Err(QueryError::syntax("LIKE pattern must be a quoted string"));
        };
        let pattern = match self.options.like {
            LikeSyntax::Regex => pattern,
            LikeSyntax::Sql => sql_like_to_regex(&pattern),
        };
        Ok(PredicateNode::Like {
            field,
            pattern,
            negated,
        })
    }

    /// Collects value words up to a stop token and resolves them as a literal.
    ///
    /// Multi-word values (a date and a time) are joined with single spaces.
    fn parse_value(&mut self, stop: impl Fn(&ClauseToken) -> bool) -> Result<Literal, QueryError> {
        let mut words: Vec<String> = Vec::new();
        while let Some(token) = self.peek() {
            if stop(token) {
                break;
            }
            match token {
                ClauseToken::Word(word) => {
                    words.push(word.clone());
                    self.advance();
                }
                other => {
                    return Err(QueryError::syntax(format!(
                        "unexpected {} in value",
                        describe(other)
                    )));
                }
            }
        }
        let dates: &dyn DateLiteralParser = self.options.date_parser.as_ref();
        parse_literal(&words.join(" "), self.replacements, dates)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&ClauseToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<ClauseToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }
}

/// Describes a token for error messages.
fn describe(token: &ClauseToken) -> String {
    match token {
        ClauseToken::Word(word) => format!("`{word}`"),
        ClauseToken::Op(op) => format!("`{}`", op.symbol()),
        ClauseToken::LParen => "`(`".to_string(),
        ClauseToken::RParen => "`)`".to_string(),
        ClauseToken::Comma => "`,`".to_string(),
    }
}

/// Translates a SQL `LIKE` pattern into an anchored regular expression.
///
/// `%` matches any run of characters and `_` exactly one; everything else is
/// literal.
pub fn sql_like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    let mut literal = String::new();
    for ch in pattern.chars() {
        let wildcard = match ch {
            '%' => ".*",
            '_' => ".",
            _ => {
                literal.push(ch);
                continue;
            }
        };
        regex.push_str(&regex::escape(&literal));
        literal.clear();
        regex.push_str(wildcard);
    }
    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::guard::{DEFAULT_QUOTES, guard};

    fn clause_with(text: &str, options: &ParseOptions) -> Result<PredicateNode, QueryError> {
        let guarded = guard(text, DEFAULT_QUOTES, 4).unwrap();
        parse_clause(&guarded.text, &guarded.replacements, options)
    }

    fn clause(text: &str) -> PredicateNode {
        clause_with(text, &ParseOptions::default()).unwrap()
    }

    fn clause_err(text: &str) -> QueryError {
        clause_with(text, &ParseOptions::default()).unwrap_err()
    }

    fn cmp(field: &str, op: CompareOp, value: Literal) -> PredicateNode {
        PredicateNode::Comparison {
            field: FieldRef::new(field),
            op,
            value,
        }
    }

    #[test]
    fn comparison_operators() {
        let cases = [
            ("a = 1", CompareOp::Eq),
            ("a == 1", CompareOp::Eq),
            ("a != 1", CompareOp::NotEq),
            ("a <> 1", CompareOp::NotEq),
            ("a > 1", CompareOp::Gt),
            ("a < 1", CompareOp::Lt),
            ("a >= 1", CompareOp::Gte),
            ("a <= 1", CompareOp::Lte),
            ("a>=1", CompareOp::Gte),
        ];
        for (text, op) in cases {
            assert_eq!(clause(text), cmp("a", op, Literal::Integer(1)), "{text}");
        }
    }

    #[test]
    fn quoted_value() {
        assert_eq!(
            clause("name = 'A and B'"),
            cmp("name", CompareOp::Eq, Literal::String("A and B".into()))
        );
    }

    #[test]
    fn quoted_field_name() {
        assert_eq!(
            clause("`my field` = 2"),
            cmp("my field", CompareOp::Eq, Literal::Integer(2))
        );
        assert_eq!(
            clause("\"my field\" = 2"),
            cmp("my field", CompareOp::Eq, Literal::Integer(2))
        );
    }

    #[test]
    fn single_quoted_field_is_rejected() {
        let err = clause_err("'y' = b");
        assert!(err.message().contains("not a field name"));
        assert_eq!(err.fragment(), Some("'y' = b"));
        assert!(err.hint().unwrap().contains("backticks"));
    }

    #[test]
    fn dotted_field_name() {
        assert_eq!(
            clause("souscription.end_date >= 2"),
            cmp("souscription.end_date", CompareOp::Gte, Literal::Integer(2))
        );
    }

    #[test]
    fn date_time_value() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            clause("created >= 2022-01-03   10:00:00"),
            cmp("created", CompareOp::Gte, Literal::Date(expected))
        );
    }

    #[test]
    fn is_null_forms() {
        assert_eq!(
            clause("a IS NULL"),
            PredicateNode::IsNull {
                field: FieldRef::new("a"),
                negated: false
            }
        );
        assert_eq!(
            clause("a is not none"),
            PredicateNode::IsNull {
                field: FieldRef::new("a"),
                negated: true
            }
        );
    }

    #[test]
    fn equality_with_null_is_a_null_test() {
        assert_eq!(
            clause("a = NULL"),
            PredicateNode::IsNull {
                field: FieldRef::new("a"),
                negated: false
            }
        );
        assert_eq!(
            clause("a <> null"),
            PredicateNode::IsNull {
                field: FieldRef::new("a"),
                negated: true
            }
        );
    }

    #[test]
    fn ordering_against_null_is_kept_for_the_emitters() {
        assert_eq!(clause("a > NULL"), cmp("a", CompareOp::Gt, Literal::Null));
    }

    #[test]
    fn between() {
        assert_eq!(
            clause("age between 18 and 30"),
            PredicateNode::Between {
                field: FieldRef::new("age"),
                low: Literal::Integer(18),
                high: Literal::Integer(30),
                negated: false,
            }
        );
        assert_eq!(
            clause("age NOT BETWEEN 1.5 AND 'z'"),
            PredicateNode::Between {
                field: FieldRef::new("age"),
                low: Literal::Float(1.5),
                high: Literal::String("z".into()),
                negated: true,
            }
        );
    }

    #[test]
    fn between_without_and_is_an_error() {
        let err = clause_err("age between 18");
        assert!(err.message().contains("BETWEEN"));
        assert_eq!(err.fragment(), Some("age between 18"));
    }

    #[test]
    fn in_list() {
        assert_eq!(
            clause("x in (1, 'two', NULL)"),
            PredicateNode::InSet {
                field: FieldRef::new("x"),
                values: vec![
                    Literal::Integer(1),
                    Literal::String("two".into()),
                    Literal::Null
                ],
                negated: false,
            }
        );
    }

    #[test]
    fn quoted_in_list_with_commas_and_parens() {
        assert_eq!(
            clause("x not in ('a,b', '(c)')"),
            PredicateNode::InSet {
                field: FieldRef::new("x"),
                values: vec![Literal::String("a,b".into()), Literal::String("(c)".into())],
                negated: true,
            }
        );
    }

    #[test]
    fn empty_in_list() {
        assert_eq!(
            clause("x IN ()"),
            PredicateNode::InSet {
                field: FieldRef::new("x"),
                values: vec![],
                negated: false,
            }
        );
    }

    #[test]
    fn malformed_in_lists() {
        assert!(clause_err("x in 1, 2").message().contains("parenthesized"));
        assert!(clause_err("x in (1,,2)").message().contains("empty value"));
        assert!(clause_err("x in (1 2").is_syntax());
    }

    #[test]
    fn like_forwards_regex() {
        assert_eq!(
            clause("name like '^Jo.*'"),
            PredicateNode::Like {
                field: FieldRef::new("name"),
                pattern: "^Jo.*".into(),
                negated: false,
            }
        );
    }

    #[test]
    fn like_with_sql_wildcards() {
        let options = ParseOptions {
            like: LikeSyntax::Sql,
            ..ParseOptions::default()
        };
        assert_eq!(
            clause_with("name NOT LIKE 'J_n%.'", &options).unwrap(),
            PredicateNode::Like {
                field: FieldRef::new("name"),
                pattern: r"^J.n.*\.$".into(),
                negated: true,
            }
        );
    }

    #[test]
    fn like_requires_a_string() {
        let err = clause_err("name like 5");
        assert!(err.message().contains("quoted string"));
    }

    #[test]
    fn truthy_constants() {
        assert_eq!(clause("1"), PredicateNode::Constant(true));
        assert_eq!(clause("TRUE"), PredicateNode::Constant(true));
        assert_eq!(clause("0"), PredicateNode::Constant(false));
        assert_eq!(clause("false"), PredicateNode::Constant(false));
        assert_eq!(clause("   "), PredicateNode::Constant(true));
    }

    #[test]
    fn unrecognized_shapes() {
        assert!(clause_err("a").message().contains("expected an operator"));
        assert!(clause_err("a ~ 3").is_syntax());
        assert!(clause_err("a = 1 2").is_syntax());
        assert!(clause_err("a = 'x' 'y'").is_syntax());
        assert!(clause_err("3 = a").message().contains("field name"));
        assert!(clause_err("a ! 3").message().contains("'='"));
        assert!(clause_err("a is 3").message().contains("NULL"));
        assert!(clause_err("a not = 3").message().contains("after NOT"));
    }

    #[test]
    fn errors_show_original_text() {
        let err = clause_err("name ~ 'A and B'");
        assert_eq!(err.fragment(), Some("name ~ 'A and B'"));
    }

    #[test]
    fn sql_like_translation() {
        assert_eq!(sql_like_to_regex("abc"), "^abc$");
        assert_eq!(sql_like_to_regex("%"), "^.*$");
        assert_eq!(sql_like_to_regex("a+b%"), r"^a\+b.*$");
    }
}
