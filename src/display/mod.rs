//! Display form of a settings document.
//!
//! A [`Display`] is regenerated from a [`ConfigDocument`] and the set of
//! collapsed sections every time either changes. Each real section renders
//! as a header line carrying a toggle marker:
//!
//! ```text
//! [-] [OPTIONS]        expanded, body follows
//! temperature = True
//! [+] [FILE_PATHS]     collapsed, body hidden
//! ```

mod anchor;

pub use anchor::ViewAnchor;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use crate::document::{ConfigDocument, SectionId, SectionKey, is_section_header};
use crate::highlight::{LineClass, Token, TokenKind, tokenize_line};

/// Toggle marker shown in front of a section header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `[+]`: body hidden, click to expand.
    Collapsed,
    /// `[-]`: body shown, click to collapse.
    Expanded,
}

impl Marker {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collapsed => "[+]",
            Self::Expanded => "[-]",
        }
    }

    /// Marker that prefixes `line`, if any. A marker only counts when the rest
    /// of the line is a section header.
    #[must_use]
    pub fn parse_prefix(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let marker = if trimmed.starts_with("[+]") {
            Self::Collapsed
        } else if trimmed.starts_with("[-]") {
            Self::Expanded
        } else {
            return None;
        };
        is_section_header(&trimmed[3..]).then_some(marker)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayLine {
    /// Section header with its toggle marker.
    Header {
        marker: Marker,
        id: SectionId,
        occurrence: usize,
    },
    /// Verbatim content line with its classification.
    Content { text: String, class: LineClass },
}

impl DisplayLine {
    fn content(text: &str) -> Self {
        Self::Content {
            text: text.to_string(),
            class: tokenize_line(text),
        }
    }

    /// The plain text of this line as shown in the editor.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Header { marker, id, .. } => Cow::Owned(format!("{marker} {id}")),
            Self::Content { text, .. } => Cow::Borrowed(text),
        }
    }

    /// Style tokens for this line. Header tokens cover the marker and the name.
    #[must_use]
    pub fn tokens(&self) -> Cow<'_, [Token]> {
        match self {
            Self::Header { id, .. } => {
                let name_start = 4;
                Cow::Owned(vec![
                    Token::new(TokenKind::Marker, 0, 3),
                    Token::new(TokenKind::SectionHeader, name_start, name_start + id.as_str().len()),
                ])
            }
            Self::Content { class, .. } => Cow::Borrowed(&class.tokens),
        }
    }

    #[must_use]
    pub fn is_header(&self) -> bool {
        matches!(self, Self::Header { .. })
    }

    /// Section key of a header line.
    #[must_use]
    pub fn section_key(&self) -> Option<SectionKey> {
        match self {
            Self::Header { id, occurrence, .. } => Some(SectionKey::new(id.clone(), *occurrence)),
            Self::Content { .. } => None,
        }
    }
}

/// Where a display line came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineOrigin {
    /// Owning section.
    pub section: SectionKey,
    /// Offset within the section's visible lines; 0 is the header for real
    /// sections and the first line for the preamble.
    pub offset: usize,
}

/// The full rendered form of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Display {
    lines: Vec<DisplayLine>,
    origins: Vec<LineOrigin>,
}

impl Display {
    /// Render `doc` with the sections in `collapsed` folded behind `[+]`.
    #[must_use]
    pub fn render(doc: &ConfigDocument, collapsed: &BTreeSet<SectionId>) -> Self {
        let mut lines = Vec::new();
        let mut origins = Vec::new();

        for section in doc.sections() {
            let key = section.key();
            if section.is_preamble() {
                for (offset, line) in section.lines().iter().enumerate() {
                    lines.push(DisplayLine::content(line));
                    origins.push(LineOrigin {
                        section: key.clone(),
                        offset,
                    });
                }
                continue;
            }

            let is_collapsed = collapsed.contains(section.id());
            lines.push(DisplayLine::Header {
                marker: if is_collapsed {
                    Marker::Collapsed
                } else {
                    Marker::Expanded
                },
                id: section.id().clone(),
                occurrence: section.occurrence(),
            });
            origins.push(LineOrigin {
                section: key.clone(),
                offset: 0,
            });
            if is_collapsed {
                continue;
            }
            for (i, line) in section.body().iter().enumerate() {
                lines.push(DisplayLine::content(line));
                origins.push(LineOrigin {
                    section: key.clone(),
                    offset: i + 1,
                });
            }
        }

        tracing::debug!(lines = lines.len(), collapsed = collapsed.len(), "rendered display");
        Self { lines, origins }
    }

    #[must_use]
    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, idx: usize) -> Option<&DisplayLine> {
        self.lines.get(idx)
    }

    /// Section and offset that produced display line `idx`.
    #[must_use]
    pub fn origin(&self, idx: usize) -> Option<&LineOrigin> {
        self.origins.get(idx)
    }

    /// Display index of the header for `key`.
    #[must_use]
    pub fn header_index(&self, key: &SectionKey) -> Option<usize> {
        self.origins
            .iter()
            .position(|o| &o.section == key && (o.offset == 0))
    }

    /// Number of display lines rendered for `key`.
    #[must_use]
    pub fn visible_len(&self, key: &SectionKey) -> usize {
        self.origins.iter().filter(|o| &o.section == key).count()
    }

    /// Display index of the first header whose identifier is `id`.
    #[must_use]
    pub fn find_header(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| match line {
            DisplayLine::Header { id: header, .. } => header.as_str() == id,
            DisplayLine::Content { .. } => false,
        })
    }

    /// The editor text: every line's text joined with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text());
        }
        out
    }
}
