//! Editable view text.
//!
//! [`ViewBuffer`] holds the display text the user edits, markers included.
//! The session replaces it wholesale after every toggle and reads it back
//! when reconstructing clean text.

use crate::display::{Display, Marker};
use crate::highlight::{LineClass, Token, TokenKind, tokenize_line};
use crate::text::rope::RopeWrapper;

/// Rope-backed editor buffer with a revision counter.
#[derive(Clone, Debug, Default)]
pub struct ViewBuffer {
    rope: RopeWrapper,
    revision: u64,
}

impl ViewBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            rope: RopeWrapper::from_str(text),
            revision: 0,
        }
    }

    /// Replace the whole buffer with a freshly rendered display.
    pub fn show(&mut self, display: &Display) {
        self.set_text(&display.to_text());
    }

    pub fn set_text(&mut self, text: &str) {
        self.rope.replace(text);
        self.revision += 1;
    }

    /// Incremented on every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[must_use]
    pub fn line(&self, idx: usize) -> Option<String> {
        self.rope.line(idx)
    }

    pub fn replace_line(&mut self, idx: usize, text: &str) -> bool {
        let changed = self.rope.replace_line(idx, text);
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn insert_line(&mut self, idx: usize, text: &str) -> bool {
        let changed = self.rope.insert_line(idx, text);
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn remove_line(&mut self, idx: usize) -> bool {
        let changed = self.rope.remove_line(idx);
        if changed {
            self.revision += 1;
        }
        changed
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Classify line `idx` as currently typed, marker headers included.
    #[must_use]
    pub fn classify(&self, idx: usize) -> Option<LineClass> {
        self.line(idx).map(|line| classify_view_line(&line))
    }
}

/// Classify a line of edited view text. Marker headers are tokenized as
/// marker plus section name; anything else goes through the line classifier.
#[must_use]
pub fn classify_view_line(line: &str) -> LineClass {
    if Marker::parse_prefix(line).is_some() {
        let lead = line.len() - line.trim_start().len();
        let body = line.trim_end();
        let name_start = body[lead + 3..]
            .find('[')
            .map_or(lead + 3, |i| lead + 3 + i);
        let mut class = tokenize_line("");
        class.tokens = vec![
            Token::new(TokenKind::Marker, lead, lead + 3),
            Token::new(TokenKind::SectionHeader, name_start, body.len()),
        ];
        return class;
    }
    tokenize_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigDocument;
    use crate::highlight::LineKind;
    use std::collections::BTreeSet;

    #[test]
    fn show_replaces_text_and_bumps_revision() {
        let doc = ConfigDocument::parse("[A]\nx = True");
        let display = Display::render(&doc, &BTreeSet::new());
        let mut view = ViewBuffer::new();
        view.show(&display);
        assert_eq!(view.text(), "[-] [A]\nx = True");
        assert_eq!(view.revision(), 1);
        assert_eq!(view.line_count(), 2);
    }

    #[test]
    fn edits_bump_revision_only_when_applied() {
        let mut view = ViewBuffer::with_text("a\nb");
        assert!(view.replace_line(1, "B"));
        assert!(!view.replace_line(7, "x"));
        assert_eq!(view.revision(), 1);
        assert!(view.insert_line(0, "top"));
        assert!(view.remove_line(2));
        assert_eq!(view.text(), "top\na");
        assert_eq!(view.revision(), 3);
    }

    #[test]
    fn view_lines_classify_markers() {
        let view = ViewBuffer::with_text("[+] [OPTIONS]\nfoo = True");
        let header = view.classify(0).unwrap();
        let line = view.line(0).unwrap();
        assert_eq!(&line[header.tokens[0].range()], "[+]");
        assert_eq!(&line[header.tokens[1].range()], "[OPTIONS]");
        assert_eq!(view.classify(1).unwrap().kind, LineKind::BoolTrue);
        assert!(view.classify(2).is_none());
    }
}
