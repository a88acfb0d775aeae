//! Line and token categories for settings text.

use std::ops::Range;

/// Classification of one content line.
///
/// The tag only affects rendering; it never changes the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Line whose trimmed form starts with `#`.
    Comment,
    /// `key = value` where the value reads `true` in any case.
    BoolTrue,
    /// `key = value` where the value reads `false` in any case.
    BoolFalse,
    /// Any other `key = value` line.
    KeyValue,
    /// Everything else: blank lines, `;` lines, stray text.
    Plain,
}

impl LineKind {
    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::BoolTrue | Self::BoolFalse)
    }

    #[must_use]
    pub const fn is_key_value(self) -> bool {
        matches!(self, Self::BoolTrue | Self::BoolFalse | Self::KeyValue)
    }
}

/// Semantic token categories used by the classifier and themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `[+]` / `[-]` toggle marker on a display header.
    Marker,
    /// Bracketed section name.
    SectionHeader,
    Comment,
    Key,
    /// The `=` separating key and value.
    Operator,
    BoolTrue,
    BoolFalse,
    Value,
    Text,
}

impl TokenKind {
    pub const COUNT: usize = 9;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Marker,
        Self::SectionHeader,
        Self::Comment,
        Self::Key,
        Self::Operator,
        Self::BoolTrue,
        Self::BoolFalse,
        Self::Value,
        Self::Text,
    ];

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }
}

/// A classified byte range of a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "token range must be start <= end");
        Self { kind, start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A token paired with its source text slice for rendering.
#[derive(Clone, Debug)]
pub struct TokenSpan<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::{LineKind, Token, TokenKind};

    #[test]
    fn token_construction_and_accessors() {
        let sample = Token::new(TokenKind::Key, 2, 8);
        assert_eq!(sample.len(), 6);
        assert!(!sample.is_empty());
        assert_eq!(sample.range(), 2..8);
        assert!(Token::new(TokenKind::Text, 5, 5).is_empty());
    }

    #[test]
    fn token_kind_indices_are_dense() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.as_usize(), i);
        }
    }

    #[test]
    fn line_kind_predicates() {
        assert!(LineKind::BoolTrue.is_bool());
        assert!(LineKind::KeyValue.is_key_value());
        assert!(!LineKind::Comment.is_key_value());
        assert!(!LineKind::Plain.is_bool());
    }
}
