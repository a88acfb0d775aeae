//! Cursor anchors that survive a re-render.
//!
//! Collapsing or expanding a section changes line counts, so a raw line
//! number saved before a toggle points somewhere else afterwards. An anchor
//! remembers the section instead and is resolved against the new display.

use unicode_segmentation::UnicodeSegmentation;

use super::Display;
use crate::document::SectionKey;

/// Section-relative cursor position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewAnchor {
    pub section: SectionKey,
    /// Line offset within the section's visible lines (0 = header).
    pub offset: usize,
    /// Column in grapheme clusters.
    pub column: usize,
}

impl ViewAnchor {
    /// Capture the position of display line `line`, column `column`.
    ///
    /// Returns `None` when `line` is past the end of the display.
    #[must_use]
    pub fn capture(display: &Display, line: usize, column: usize) -> Option<Self> {
        let origin = display.origin(line)?;
        Some(Self {
            section: origin.section.clone(),
            offset: origin.offset,
            column,
        })
    }

    /// Map the anchor onto `display`, returning `(line, column)`.
    ///
    /// A vanished section resolves to the top. A collapsed section resolves
    /// to its header. Offsets and columns are clamped to what is visible.
    #[must_use]
    pub fn resolve(&self, display: &Display) -> (usize, usize) {
        let Some(start) = display.header_index(&self.section) else {
            return (0, 0);
        };
        let visible = display.visible_len(&self.section).max(1);
        let line = start + self.offset.min(visible - 1);
        let width = display
            .line(line)
            .map_or(0, |l| l.text().graphemes(true).count());
        (line, self.column.min(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ConfigDocument, SectionId};
    use std::collections::BTreeSet;

    const TEXT: &str = "[A]\na1\na2\n[B]\nb1 = é\nb2";

    #[test]
    fn anchor_follows_section_across_collapse() {
        let doc = ConfigDocument::parse(TEXT);
        let expanded = Display::render(&doc, &BTreeSet::new());
        let anchor = ViewAnchor::capture(&expanded, 4, 2).unwrap();
        assert_eq!(anchor.section, SectionKey::new("[B]", 0));
        assert_eq!(anchor.offset, 1);

        let collapsed: BTreeSet<SectionId> = [SectionId::new("[A]")].into_iter().collect();
        let folded = Display::render(&doc, &collapsed);
        assert_eq!(anchor.resolve(&folded), (2, 2));
    }

    #[test]
    fn anchor_in_collapsed_section_lands_on_header() {
        let doc = ConfigDocument::parse(TEXT);
        let expanded = Display::render(&doc, &BTreeSet::new());
        let anchor = ViewAnchor::capture(&expanded, 5, 1).unwrap();

        let collapsed: BTreeSet<SectionId> = [SectionId::new("[B]")].into_iter().collect();
        let folded = Display::render(&doc, &collapsed);
        assert_eq!(anchor.resolve(&folded), (3, 1));
    }

    #[test]
    fn column_clamps_to_graphemes() {
        let doc = ConfigDocument::parse(TEXT);
        let display = Display::render(&doc, &BTreeSet::new());
        let anchor = ViewAnchor::capture(&display, 4, 99).unwrap();
        // "b1 = é" is six graphemes
        assert_eq!(anchor.resolve(&display), (4, 6));
    }

    #[test]
    fn missing_section_resolves_to_top() {
        let doc = ConfigDocument::parse(TEXT);
        let display = Display::render(&doc, &BTreeSet::new());
        let anchor = ViewAnchor {
            section: SectionKey::new("[GONE]", 0),
            offset: 3,
            column: 3,
        };
        assert_eq!(anchor.resolve(&display), (0, 0));
        assert!(ViewAnchor::capture(&display, 100, 0).is_none());
    }
}
