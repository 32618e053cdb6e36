//! Quoting guard.
//!
//! Swaps every quoted literal for an opaque placeholder token so the
//! structural passes never see parentheses, keywords or operators that live
//! inside quotes (`name = 'A and B'`). Placeholders have the shape
//! `<marker><index><marker>`, where the marker is the shortest lowercase
//! sequence that does not occur anywhere in the input.

use crate::error::QueryError;

/// Quote characters recognized by default.
pub const DEFAULT_QUOTES: &[char] = &['\'', '"', '`'];

/// Default upper bound on the placeholder marker length.
pub const DEFAULT_MARKER_MAX_LEN: usize = 4;

/// Alphabet the marker search enumerates, in order.
const MARKER_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Mapping from placeholder tokens back to the quoted text they replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    /// Marker framing every placeholder; empty when nothing was replaced.
    marker: String,
    /// Original quoted substrings (quotes included), indexed by placeholder number.
    originals: Vec<String>,
}

impl Replacements {
    /// Returns the number of replaced literals.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Returns true when the input contained no quoted literals.
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Returns the placeholder marker (empty if nothing was replaced).
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns the placeholder token for the literal at `index`.
    pub fn placeholder(&self, index: usize) -> String {
        format!("{m}{index}{m}", m = self.marker)
    }

    /// Looks up the original quoted text for an exact placeholder token.
    pub fn get(&self, token: &str) -> Option<&str> {
        let index = self.parse_placeholder(token)?;
        self.originals.get(index).map(String::as_str)
    }

    /// Returns true if `text` contains any part of a placeholder.
    ///
    /// Used to reject words where a placeholder was glued to other text.
    pub fn touches(&self, text: &str) -> bool {
        !self.marker.is_empty() && text.contains(&self.marker)
    }

    /// Iterates over `(placeholder, original)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.originals
            .iter()
            .enumerate()
            .map(|(i, original)| (self.placeholder(i), original.as_str()))
    }

    /// Parses `<marker><digits><marker>` into the placeholder index.
    fn parse_placeholder(&self, token: &str) -> Option<usize> {
        if self.marker.is_empty() {
            return None;
        }
        let digits = token
            .strip_prefix(&self.marker)?
            .strip_suffix(&self.marker)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Length of the placeholder starting at the beginning of `text`, if any.
    fn placeholder_prefix_len(&self, text: &str) -> Option<(usize, usize)> {
        let rest = text.strip_prefix(&self.marker)?;
        let digit_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digit_len == 0 || !rest[digit_len..].starts_with(&self.marker) {
            return None;
        }
        let index = rest[..digit_len].parse().ok()?;
        Some((index, self.marker.len() * 2 + digit_len))
    }
}

/// Input text with its quoted literals replaced by placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded {
    /// The guarded text.
    pub text: String,
    /// Placeholder mapping needed to restore the literals.
    pub replacements: Replacements,
}

/// Replaces quoted spans in `text` with placeholder tokens.
///
/// A quoted span starts with any character in `quotes` and ends at the next
/// unescaped occurrence of the same character; a backslash escapes the
/// following character. The marker search tries every lowercase sequence of
/// length 1 through `max_marker_len` and fails with
/// [`QueryError::PlaceholderExhausted`] if all of them occur in the input.
pub fn guard(text: &str, quotes: &[char], max_marker_len: usize) -> Result<Guarded, QueryError> {
    let Some(first_quote) = text.find(|c| quotes.contains(&c)) else {
        return Ok(Guarded {
            text: text.to_string(),
            replacements: Replacements::default(),
        });
    };

    let marker = find_unused_marker(text, max_marker_len)?;
    let mut replacements = Replacements {
        marker,
        originals: Vec::new(),
    };
    let mut guarded = String::with_capacity(text.len());
    guarded.push_str(&text[..first_quote]);

    let mut rest = &text[first_quote..];
    while let Some(start) = rest.find(|c| quotes.contains(&c)) {
        guarded.push_str(&rest[..start]);
        let quoted = &rest[start..];
        let end = closing_quote_end(quoted)
            .ok_or_else(|| QueryError::syntax_at("unterminated quote", quoted.to_string()))?;
        let index = replacements.originals.len();
        replacements.originals.push(quoted[..end].to_string());
        guarded.push_str(&replacements.placeholder(index));
        rest = &quoted[end..];
    }
    guarded.push_str(rest);

    Ok(Guarded {
        text: guarded,
        replacements,
    })
}

/// Restores the quoted literals in guarded text.
///
/// This is the exact inverse of [`guard`]: `unguard(&guard(s)?.text, ..) == s`.
pub fn unguard(text: &str, replacements: &Replacements) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    let mut restored = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(&replacements.marker) {
        restored.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match replacements.placeholder_prefix_len(candidate) {
            Some((index, len)) if index < replacements.originals.len() => {
                restored.push_str(&replacements.originals[index]);
                rest = &candidate[len..];
            }
            _ => {
                let step = candidate.chars().next().map_or(1, char::len_utf8);
                restored.push_str(&candidate[..step]);
                rest = &candidate[step..];
            }
        }
    }
    restored.push_str(rest);
    restored
}

/// Strips the surrounding quotes from a quoted literal and resolves escapes.
///
/// `'it\'s'` becomes `it's`; a backslash keeps the character that follows it.
pub fn unquote(quoted: &str) -> String {
    let mut chars = quoted.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return String::new();
    };
    debug_assert_eq!(open, close);

    let mut content = String::with_capacity(quoted.len());
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                content.push(escaped);
            }
        } else {
            content.push(ch);
        }
    }
    content
}

/// Returns the byte length of the quoted span at the start of `quoted`,
/// closing quote included, or `None` if the quote is never closed.
fn closing_quote_end(quoted: &str) -> Option<usize> {
    let mut chars = quoted.char_indices();
    let (_, quote) = chars.next()?;
    while let Some((pos, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
        } else if ch == quote {
            return Some(pos + ch.len_utf8());
        }
    }
    None
}

/// Finds the shortest lowercase sequence absent from `text`.
fn find_unused_marker(text: &str, max_len: usize) -> Result<String, QueryError> {
    for len in 1..=max_len {
        let mut digits = vec![0usize; len];
        loop {
            let candidate: String = digits
                .iter()
                .map(|&d| char::from(MARKER_ALPHABET[d]))
                .collect();
            if !text.contains(&candidate) {
                return Ok(candidate);
            }
            if !advance_odometer(&mut digits) {
                break;
            }
        }
    }
    Err(QueryError::PlaceholderExhausted { max_len })
}

/// Steps a base-26 odometer; returns false once every combination was seen.
fn advance_odometer(digits: &mut [usize]) -> bool {
    for digit in digits.iter_mut().rev() {
        *digit += 1;
        if *digit < MARKER_ALPHABET.len() {
            return true;
        }
        *digit = 0;
    }
    false
}
