//! Snapshot of the fully expanded text taken at the last toggle.

use crate::document::{ConfigDocument, Section, SectionKey};

/// Full, all-expanded content captured whenever a section is collapsed or
/// expanded. Collapsed sections get their bodies back from here.
#[derive(Clone, Debug, Default)]
pub struct PendingEditCache {
    snapshot: Option<ConfigDocument>,
}

impl PendingEditCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with `text`.
    pub fn store(&mut self, text: &str) {
        self.snapshot = Some(ConfigDocument::parse(text));
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }

    /// The cached full text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.snapshot.as_ref().map(ConfigDocument::raw_text)
    }

    /// Cached copy of one section.
    #[must_use]
    pub fn section(&self, key: &SectionKey) -> Option<&Section> {
        self.snapshot.as_ref()?.section(key)
    }
}
