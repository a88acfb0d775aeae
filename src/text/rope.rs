//! Rope wrapper using the ropey crate.
//!
//! The crate builds ropey without `unicode_lines` and `cr_lines`, so `\n` is
//! the only line break and a `\r` stays part of its line.

use ropey::Rope;

/// Wrapper around `ropey::Rope` addressing text by line.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Number of lines; text ending in `\n` has a trailing empty line.
    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Char range of line `idx` without its trailing `\n`.
    fn content_range(&self, idx: usize) -> Option<(usize, usize)> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_char(idx);
        let line = self.rope.line(idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
        }
        Some((start, start + len))
    }

    /// Line `idx` without its trailing `\n`.
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<String> {
        let (start, end) = self.content_range(idx)?;
        Some(self.rope.slice(start..end).to_string())
    }

    /// Replace the content of line `idx`. Returns `false` if out of range.
    pub fn replace_line(&mut self, idx: usize, text: &str) -> bool {
        let Some((start, end)) = self.content_range(idx) else {
            return false;
        };
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        true
    }

    /// Insert a new line before line `idx`; `idx == len_lines()` appends.
    pub fn insert_line(&mut self, idx: usize, text: &str) -> bool {
        let lines = self.rope.len_lines();
        if idx > lines {
            return false;
        }
        if idx == lines {
            let end = self.rope.len_chars();
            self.rope.insert(end, &format!("\n{text}"));
        } else {
            let start = self.rope.line_to_char(idx);
            self.rope.insert(start, &format!("{text}\n"));
        }
        true
    }

    /// Remove line `idx` together with one adjacent line break.
    pub fn remove_line(&mut self, idx: usize) -> bool {
        let Some((start, end)) = self.content_range(idx) else {
            return false;
        };
        let total = self.rope.len_chars();
        if end < total {
            self.rope.remove(start..=end);
        } else if start > 0 {
            self.rope.remove(start - 1..end);
        } else {
            self.rope.remove(start..end);
        }
        true
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lf_breaks_lines() {
        let rope = RopeWrapper::from_str("a\r\nb\rc\n");
        assert_eq!(rope.len_lines(), 2 + 1);
        assert_eq!(rope.line(0).as_deref(), Some("a\r"));
        assert_eq!(rope.line(1).as_deref(), Some("b\rc"));
        assert_eq!(rope.line(2).as_deref(), Some(""));
        assert_eq!(rope.line(3), None);
    }

    #[test]
    fn replace_line_keeps_breaks() {
        let mut rope = RopeWrapper::from_str("one\ntwo\nthree");
        assert!(rope.replace_line(1, "2"));
        assert!(rope.replace_line(2, "3"));
        assert_eq!(rope.to_string(), "one\n2\n3");
        assert!(!rope.replace_line(3, "x"));
    }

    #[test]
    fn insert_and_remove_lines() {
        let mut rope = RopeWrapper::from_str("a\nc");
        assert!(rope.insert_line(1, "b"));
        assert_eq!(rope.to_string(), "a\nb\nc");
        assert!(rope.insert_line(3, "d"));
        assert_eq!(rope.to_string(), "a\nb\nc\nd");
        assert!(rope.remove_line(3));
        assert_eq!(rope.to_string(), "a\nb\nc");
        assert!(rope.remove_line(0));
        assert_eq!(rope.to_string(), "b\nc");
        assert!(!rope.insert_line(5, "x"));
    }

    #[test]
    fn remove_only_line_empties_rope() {
        let mut rope = RopeWrapper::from_str("solo");
        assert!(rope.remove_line(0));
        assert!(rope.is_empty());
        assert_eq!(rope.len_lines(), 1);
    }
}
