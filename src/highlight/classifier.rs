//! Line classifier for settings text.
//!
//! Every function here is a pure function of the line, so classifying the
//! same line again always yields the same result.

use super::token::{LineKind, Token, TokenKind, TokenSpan};

/// Returns `true` for `#` and `;` comment lines, which never carry a value.
#[must_use]
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Split a non-comment line once on its first `=`.
///
/// Returns the raw key part (everything before `=`, untrimmed) and the raw
/// value part.
#[must_use]
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    if is_comment(line) {
        return None;
    }
    line.split_once('=')
}

/// Classify a single line.
#[must_use]
pub fn classify_line(line: &str) -> LineKind {
    if line.trim_start().starts_with('#') {
        return LineKind::Comment;
    }
    match split_key_value(line) {
        Some((_, value)) => value_kind(value.trim()),
        None => LineKind::Plain,
    }
}

fn value_kind(value: &str) -> LineKind {
    if value.eq_ignore_ascii_case("true") {
        LineKind::BoolTrue
    } else if value.eq_ignore_ascii_case("false") {
        LineKind::BoolFalse
    } else {
        LineKind::KeyValue
    }
}

/// A classified line plus the token ranges a theme colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineClass {
    pub kind: LineKind,
    pub tokens: Vec<Token>,
}

impl LineClass {
    /// Pair each token with its slice of `line`.
    #[must_use]
    pub fn spans<'a>(&self, line: &'a str) -> Vec<TokenSpan<'a>> {
        self.tokens
            .iter()
            .filter_map(|t| {
                line.get(t.range()).map(|text| TokenSpan {
                    kind: t.kind,
                    text,
                })
            })
            .collect()
    }
}

/// Classify `line` and locate its key, operator, and value.
///
/// Whitespace around key and value is left outside the tokens so that
/// rendering preserves it untouched.
#[must_use]
pub fn tokenize_line(line: &str) -> LineClass {
    let kind = classify_line(line);
    let mut tokens = Vec::new();

    match kind {
        LineKind::Comment => {
            let start = line.len() - line.trim_start().len();
            tokens.push(Token::new(TokenKind::Comment, start, line.len()));
        }
        LineKind::Plain => {
            if !line.trim().is_empty() {
                tokens.push(Token::new(TokenKind::Text, 0, line.len()));
            }
        }
        LineKind::BoolTrue | LineKind::BoolFalse | LineKind::KeyValue => {
            // classify_line only reports key-value kinds when '=' is present
            let eq = line.find('=').unwrap_or(line.len());
            if let Some(range) = trimmed_range(line, 0, eq) {
                tokens.push(Token::new(TokenKind::Key, range.0, range.1));
            }
            if eq < line.len() {
                tokens.push(Token::new(TokenKind::Operator, eq, eq + 1));
            }
            let value_kind = match kind {
                LineKind::BoolTrue => TokenKind::BoolTrue,
                LineKind::BoolFalse => TokenKind::BoolFalse,
                _ => TokenKind::Value,
            };
            if let Some(range) = trimmed_range(line, (eq + 1).min(line.len()), line.len()) {
                tokens.push(Token::new(value_kind, range.0, range.1));
            }
        }
    }

    LineClass { kind, tokens }
}

/// Byte range of `line[start..end]` with surrounding whitespace removed.
fn trimmed_range(line: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = line.get(start..end)?;
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        None
    } else {
        let s = start + leading;
        Some((s, s + trimmed.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_booleans_case_insensitively() {
        assert_eq!(classify_line("foo = True"), LineKind::BoolTrue);
        assert_eq!(classify_line("bar = False"), LineKind::BoolFalse);
        assert_eq!(classify_line("  x=TRUE  "), LineKind::BoolTrue);
        assert_eq!(classify_line("y =false\r"), LineKind::BoolFalse);
        assert_eq!(classify_line("z = truthy"), LineKind::KeyValue);
    }

    #[test]
    fn comments_and_plain_lines() {
        assert_eq!(classify_line("# a = True"), LineKind::Comment);
        assert_eq!(classify_line("   # indented"), LineKind::Comment);
        assert_eq!(classify_line("; a = True"), LineKind::Plain);
        assert_eq!(classify_line(""), LineKind::Plain);
        assert_eq!(classify_line("just words"), LineKind::Plain);
    }

    #[test]
    fn splits_on_first_equals_only() {
        assert_eq!(split_key_value("a = b = c"), Some(("a ", " b = c")));
        assert_eq!(classify_line("a = b = c"), LineKind::KeyValue);
        assert_eq!(classify_line("key ="), LineKind::KeyValue);
        assert_eq!(split_key_value("; a = b"), None);
    }

    #[test]
    fn reclassification_is_stable() {
        for line in ["foo = True", "# c", "x", "", "k = v"] {
            let first = tokenize_line(line);
            for _ in 0..3 {
                assert_eq!(tokenize_line(line), first);
            }
        }
    }

    #[test]
    fn tokens_exclude_surrounding_whitespace() {
        let line = "  foo  =  True ";
        let class = tokenize_line(line);
        let spans = class.spans(line);
        let texts: Vec<(TokenKind, &str)> = spans.iter().map(|s| (s.kind, s.text)).collect();
        assert_eq!(
            texts,
            vec![
                (TokenKind::Key, "foo"),
                (TokenKind::Operator, "="),
                (TokenKind::BoolTrue, "True"),
            ]
        );
    }

    #[test]
    fn comment_token_starts_at_hash() {
        let class = tokenize_line("   # note");
        assert_eq!(class.tokens, vec![Token::new(TokenKind::Comment, 3, 9)]);
    }

    #[test]
    fn empty_value_has_no_value_token() {
        let class = tokenize_line("MaskMap =");
        assert_eq!(class.kind, LineKind::KeyValue);
        assert_eq!(class.tokens.len(), 2);
        assert!(tokenize_line("").tokens.is_empty());
    }
}
