//! Settings documents split into ordered sections.
//!
//! [`ConfigDocument::parse`] never fails and never loses a line: joining the
//! lines of every section with `\n` reproduces the input byte for byte. Only
//! `\n` separates lines, so a CRLF file keeps its `\r` inside each line.
//!
//! Sections that share a header are kept side by side and told apart by
//! their occurrence index.

mod section;

pub use section::{Section, SectionId, SectionKey};

use std::collections::HashMap;

/// Returns `true` for a line that starts a new section.
///
/// A header is any line whose trimmed form starts with `[` and ends with `]`.
/// Anything else, including `[broken`, is ordinary content.
#[must_use]
pub fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Ordered sections of a settings file plus the text they were parsed from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    raw_text: String,
    sections: Vec<Section>,
}

impl ConfigDocument {
    /// Split `text` into sections.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut sections: Vec<Section> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for line in text.split('\n') {
            if is_section_header(line) {
                let id = line.trim().to_string();
                let occurrence = seen.entry(id.clone()).or_insert(0);
                sections.push(Section::new(
                    SectionId::new(id),
                    *occurrence,
                    vec![line.to_string()],
                ));
                *occurrence += 1;
            } else if let Some(current) = sections.last_mut() {
                current.lines_mut().push(line.to_string());
            } else {
                sections.push(Section::new(
                    SectionId::preamble(),
                    0,
                    vec![line.to_string()],
                ));
            }
        }

        tracing::trace!(sections = sections.len(), bytes = text.len(), "parsed settings text");
        Self {
            raw_text: text.to_string(),
            sections,
        }
    }

    /// Rebuild a document from edited sections.
    #[must_use]
    pub(crate) fn from_sections(sections: Vec<Section>) -> Self {
        let raw_text = join_sections(&sections);
        Self { raw_text, sections }
    }

    /// The text this document was parsed from.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The section for `key`, if present.
    #[must_use]
    pub fn section(&self, key: &SectionKey) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.id() == &key.id && s.occurrence() == key.occurrence)
    }

    /// The first section named `id`.
    #[must_use]
    pub fn first(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id().as_str() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.first(id).is_some()
    }

    /// Distinct identifiers of real sections, in first-appearance order.
    #[must_use]
    pub fn section_ids(&self) -> Vec<SectionId> {
        let mut ids: Vec<SectionId> = Vec::new();
        for section in &self.sections {
            if !section.is_preamble() && !ids.contains(section.id()) {
                ids.push(section.id().clone());
            }
        }
        ids
    }

    /// Identifiers that appear on more than one header.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<SectionId> {
        self.sections
            .iter()
            .filter(|s| s.occurrence() == 1)
            .map(|s| s.id().clone())
            .collect()
    }

    /// Join all sections back into text.
    #[must_use]
    pub fn to_text(&self) -> String {
        join_sections(&self.sections)
    }
}

fn join_sections(sections: &[Section]) -> String {
    let mut out = String::new();
    let mut first = true;
    for line in sections.iter().flat_map(Section::lines) {
        if !first {
            out.push('\n');
        }
        out.push_str(line);
        first = false;
    }
    out
}
