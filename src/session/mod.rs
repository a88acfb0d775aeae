//! Editing session: one document, its collapsed set, and the view text.
//!
//! Every operation that changes what is shown goes through the same cycle:
//! reconstruct clean text from the view, cache it, re-parse it, then render a
//! fresh display and replace the view wholesale. Display line numbers do not
//! survive that cycle; use [`ViewAnchor`] to carry a cursor across it.

mod cache;

pub use cache::PendingEditCache;

use std::collections::BTreeSet;
use std::path::Path;

use crate::display::{Display, ViewAnchor};
use crate::document::{ConfigDocument, SectionId};
use crate::error::{Error, Result};
use crate::event::{EventSink, SessionEvent};
use crate::fields::{DateRange, FieldValues, apply_dates, update_fields};
use crate::options::{BoolOptions, set_option_line};
use crate::placeholder::{PlaceholderResolver, Resolution};
use crate::reconstruct::{Reconstruction, reconstruct};
use crate::text::ViewBuffer;

/// A single logical editing session.
#[derive(Debug)]
pub struct EditSession {
    document: ConfigDocument,
    collapsed: BTreeSet<SectionId>,
    cache: PendingEditCache,
    display: Display,
    view: ViewBuffer,
    saved_text: String,
    source_name: Option<String>,
    events: EventSink,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        let document = ConfigDocument::parse("");
        let display = Display::render(&document, &BTreeSet::new());
        let mut view = ViewBuffer::new();
        view.show(&display);
        Self {
            document,
            collapsed: BTreeSet::new(),
            cache: PendingEditCache::new(),
            display,
            view,
            saved_text: String::new(),
            source_name: None,
            events: EventSink::new(),
        }
    }

    /// A session holding `text`, loaded from `source`.
    #[must_use]
    pub fn from_text(text: &str, source: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.load(text, source);
        session
    }

    /// Replace everything with freshly loaded text. Collapsed state and the
    /// cache are discarded.
    pub fn load(&mut self, text: &str, source: impl Into<String>) {
        let source = source.into();
        self.document = ConfigDocument::parse(text);
        self.collapsed.clear();
        self.cache.clear();
        self.saved_text = text.to_string();

        for id in self.document.duplicate_ids() {
            tracing::warn!(section = %id, "duplicate section header; occurrences kept separately");
        }
        let sections = self.document.section_ids().len();
        tracing::debug!(%source, sections, bytes = text.len(), "loaded settings");

        self.source_name = Some(source.clone());
        self.events.emit(&SessionEvent::Loaded { source, sections });
        self.render();
    }

    /// Register the callback that receives this session's events.
    pub fn set_event_callback<F>(&mut self, callback: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.set(callback);
    }

    pub fn clear_event_callback(&mut self) {
        self.events.clear();
    }

    /// Last parsed document. It trails the view until the next toggle,
    /// change, or save.
    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    #[must_use]
    pub fn collapsed(&self) -> &BTreeSet<SectionId> {
        &self.collapsed
    }

    #[must_use]
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    #[must_use]
    pub fn cache(&self) -> &PendingEditCache {
        &self.cache
    }

    #[must_use]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[must_use]
    pub fn view(&self) -> &ViewBuffer {
        &self.view
    }

    /// The editable view. Edits here are picked up by the next
    /// reconstruction.
    pub fn view_mut(&mut self) -> &mut ViewBuffer {
        &mut self.view
    }

    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Text as last loaded or saved.
    #[must_use]
    pub fn saved_text(&self) -> &str {
        &self.saved_text
    }

    #[must_use]
    pub fn section_ids(&self) -> Vec<SectionId> {
        self.document.section_ids()
    }

    /// Rebuild clean text from the current view without touching the
    /// session.
    #[must_use]
    pub fn reconstruct(&self) -> Reconstruction {
        reconstruct(&self.view.text(), &self.collapsed, &self.cache, &self.document)
    }

    /// Marker-free text with every section restored.
    #[must_use]
    pub fn clean_text(&self) -> String {
        self.reconstruct().text
    }

    /// The clean text parsed into a document.
    #[must_use]
    pub fn clean_document(&self) -> ConfigDocument {
        ConfigDocument::parse(&self.clean_text())
    }

    /// Whether the clean text differs from what was last loaded or saved.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.clean_text() != self.saved_text
    }

    /// Reconstruct, then make the result the cache and the document.
    fn snapshot(&mut self) -> String {
        let rebuilt = self.reconstruct();
        for key in &rebuilt.recovered {
            self.events.emit(&SessionEvent::Recovered(key.clone()));
        }
        self.commit(&rebuilt.text);
        rebuilt.text
    }

    fn commit(&mut self, text: &str) {
        self.cache.store(text);
        self.document = ConfigDocument::parse(text);
        let document = &self.document;
        let before = self.collapsed.len();
        self.collapsed.retain(|id| document.contains(id.as_str()));
        if self.collapsed.len() != before {
            tracing::debug!(pruned = before - self.collapsed.len(), "dropped stale collapsed sections");
        }
    }

    fn render(&mut self) {
        self.display = Display::render(&self.document, &self.collapsed);
        self.view.show(&self.display);
        self.events.emit(&SessionEvent::Rendered {
            lines: self.display.len(),
        });
    }

    /// Collapse or expand every section named `id`.
    ///
    /// Pending edits are captured before the collapsed set changes, and the
    /// view is re-rendered afterwards. Returns whether the state changed.
    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<bool> {
        let rebuilt = self.reconstruct();
        let candidate = ConfigDocument::parse(&rebuilt.text);
        if SectionId::new(id).is_preamble() {
            return Err(Error::NotCollapsible(id.to_string()));
        }
        if !candidate.contains(id) {
            return Err(Error::UnknownSection(id.to_string()));
        }

        self.snapshot();
        let changed = if collapsed {
            self.collapsed.insert(SectionId::new(id))
        } else {
            self.collapsed.remove(id)
        };
        tracing::debug!(section = id, collapsed, changed, "toggled section");

        let event = if collapsed {
            SessionEvent::Collapsed(SectionId::new(id))
        } else {
            SessionEvent::Expanded(SectionId::new(id))
        };
        self.events.emit(&event);
        self.render();
        Ok(changed)
    }

    pub fn collapse(&mut self, id: &str) -> Result<bool> {
        self.set_collapsed(id, true)
    }

    pub fn expand(&mut self, id: &str) -> Result<bool> {
        self.set_collapsed(id, false)
    }

    /// Flip the state of `id`, returning whether it is now collapsed.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let collapse = !self.is_collapsed(id);
        self.set_collapsed(id, collapse)?;
        Ok(collapse)
    }

    /// Collapse every section in the edited text, including headers typed
    /// since the last toggle.
    pub fn collapse_all(&mut self) -> Result<()> {
        self.set_all(true)
    }

    pub fn expand_all(&mut self) -> Result<()> {
        self.set_all(false)
    }

    fn set_all(&mut self, collapsed: bool) -> Result<()> {
        // ids come from the view, not the last committed document
        for id in self.clean_document().section_ids() {
            self.set_collapsed(id.as_str(), collapsed)?;
        }
        Ok(())
    }

    /// Apply a pure text transformation to the clean text, keeping the
    /// collapsed set. Returns whether the text changed.
    pub fn apply_change<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&str) -> String,
    {
        let before = self.snapshot();
        let after = f(&before);
        let changed = after != before;
        if changed {
            self.commit(&after);
        }
        self.render();
        changed
    }

    /// Record a successful save of `text` to `path`.
    pub fn mark_saved(&mut self, text: &str, path: &Path) {
        self.commit(text);
        self.saved_text = text.to_string();
        self.render();
        tracing::debug!(path = %path.display(), bytes = text.len(), "saved settings");
        self.events.emit(&SessionEvent::Saved(path.to_path_buf()));
    }

    /// Date and path fields of the clean text.
    #[must_use]
    pub fn fields(&self) -> FieldValues {
        FieldValues::extract(&self.clean_text())
    }

    /// Rewrite `key = value` lines in place.
    pub fn set_fields<K, V>(&mut self, updates: &[(K, V)]) -> bool
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.apply_change(|text| update_fields(text, updates))
    }

    /// Write the three date keys using `pattern`.
    pub fn set_dates(&mut self, range: &DateRange, pattern: &str) -> bool {
        self.apply_change(|text| apply_dates(text, range, pattern))
    }

    /// Boolean options of the clean text.
    #[must_use]
    pub fn options(&self) -> BoolOptions {
        BoolOptions::from_document(&self.clean_document())
    }

    /// Set a boolean option. Returns `false` when no line in `section`
    /// assigns `key`.
    pub fn set_option(&mut self, section: &str, key: &str, value: bool) -> bool {
        let mut matched = false;
        self.apply_change(|text| {
            let (updated, found) = set_option_line(text, section, key, value);
            matched = found;
            updated
        });
        matched
    }

    /// Resolve `$(Section:Key)` tokens in `path` against the clean text.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Resolution {
        let doc = self.clean_document();
        PlaceholderResolver::new(&doc).resolve(path)
    }

    /// Anchor for view line `line`, column `column` in the current display.
    #[must_use]
    pub fn anchor_at(&self, line: usize, column: usize) -> Option<ViewAnchor> {
        ViewAnchor::capture(&self.display, line, column)
    }

    /// `(line, column)` of `anchor` in the current display.
    #[must_use]
    pub fn resolve_anchor(&self, anchor: &ViewAnchor) -> (usize, usize) {
        anchor.resolve(&self.display)
    }
}
