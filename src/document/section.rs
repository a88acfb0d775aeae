//! Section identifiers and section storage.

use std::borrow::Borrow;
use std::fmt;

/// Identifier of a section: the trimmed bracketed header (`[OPTIONS]`), or
/// the synthetic preamble identifier for text preceding the first header.
///
/// Identifiers are compared verbatim; `[Options]` and `[OPTIONS]` are
/// different sections.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(String);

impl SectionId {
    /// Identifier used for lines appearing before any header.
    pub const PREAMBLE: &'static str = "header";

    /// Create an identifier from a header such as `[OPTIONS]`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The synthetic preamble identifier.
    #[must_use]
    pub fn preamble() -> Self {
        Self(Self::PREAMBLE.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_preamble(&self) -> bool {
        self.0 == Self::PREAMBLE
    }

    /// Section name without the surrounding brackets (`OPTIONS`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Position-stable reference to one section: its identifier plus how many
/// earlier sections share that identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub id: SectionId,
    pub occurrence: usize,
}

impl SectionKey {
    #[must_use]
    pub fn new(id: impl Into<SectionId>, occurrence: usize) -> Self {
        Self {
            id: id.into(),
            occurrence,
        }
    }
}

/// A section and its raw lines. For real sections the first line is the
/// header line exactly as it appeared in the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    occurrence: usize,
    lines: Vec<String>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(id: SectionId, occurrence: usize, lines: Vec<String>) -> Self {
        Self {
            id,
            occurrence,
            lines,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    #[must_use]
    pub fn key(&self) -> SectionKey {
        SectionKey::new(self.id.clone(), self.occurrence)
    }

    #[must_use]
    pub fn is_preamble(&self) -> bool {
        self.id.is_preamble()
    }

    /// All raw lines, header line included.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The verbatim header line, `None` for the preamble.
    #[must_use]
    pub fn header_line(&self) -> Option<&str> {
        if self.is_preamble() {
            None
        } else {
            self.lines.first().map(String::as_str)
        }
    }

    /// Lines following the header (every line for the preamble).
    #[must_use]
    pub fn body(&self) -> &[String] {
        if self.is_preamble() {
            &self.lines
        } else {
            self.lines.get(1..).unwrap_or_default()
        }
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_id_name_strips_brackets() {
        assert_eq!(SectionId::new("[OPTIONS]").name(), "OPTIONS");
        assert_eq!(SectionId::preamble().name(), "header");
        assert!(SectionId::preamble().is_preamble());
        assert!(!SectionId::new("[header]").is_preamble());
    }

    #[test]
    fn section_body_excludes_header() {
        let section = Section::new(
            SectionId::new("[A]"),
            0,
            vec!["[A]".into(), "x = 1".into()],
        );
        assert_eq!(section.header_line(), Some("[A]"));
        assert_eq!(section.body(), &["x = 1".to_string()]);

        let preamble = Section::new(SectionId::preamble(), 0, vec!["# top".into()]);
        assert_eq!(preamble.header_line(), None);
        assert_eq!(preamble.body().len(), 1);
    }
}
