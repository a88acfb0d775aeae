//! Clean text from edited display text.
//!
//! The display carries `[+]`/`[-]` markers and hides collapsed bodies behind
//! a single header line. Reconstruction strips the markers and puts every
//! collapsed body back, taking it from the pending-edit cache or, failing
//! that, from the last known document. Content is never dropped: a section
//! that cannot be restored keeps its placeholder and is reported.

use std::collections::BTreeSet;

use crate::display::Marker;
use crate::document::{ConfigDocument, Section, SectionId, SectionKey};
use crate::session::PendingEditCache;

/// Remove toggle markers from display text.
///
/// A marker line keeps everything from its second `[` onward, which is the
/// real section header. All other lines are returned verbatim.
#[must_use]
pub fn strip_markers(display_text: &str) -> String {
    display_text
        .split('\n')
        .map(strip_marker_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_marker_line(line: &str) -> &str {
    if Marker::parse_prefix(line).is_none() {
        return line;
    }
    let first = line.find('[').unwrap_or(0);
    match line[first + 1..].find('[') {
        Some(i) => &line[first + 1 + i..],
        None => line,
    }
}

/// Where a collapsed section's body came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodySource {
    Cache,
    /// Last known document, used when the cache has no entry.
    Document,
}

/// Result of [`reconstruct`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconstruction {
    /// Marker-free text with every section restored.
    pub text: String,
    /// Collapsed sections whose bodies came from the document fallback.
    pub recovered: Vec<SectionKey>,
    /// Collapsed sections with no body anywhere; their header is kept.
    pub unrecovered: Vec<SectionKey>,
}

impl Reconstruction {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unrecovered.is_empty()
    }
}

/// Rebuild clean text from `display_text`.
///
/// `document` is the text the display was rendered from. Each header in the
/// edited display is paired with the header it came from, so removing or
/// adding a placeholder never hands a duplicate section someone else's body.
/// Sections still present in `document` get their verbatim header line back,
/// so indentation and trailing `\r` around headers survive the display.
#[must_use]
pub fn reconstruct(
    display_text: &str,
    collapsed: &BTreeSet<SectionId>,
    cache: &PendingEditCache,
    document: &ConfigDocument,
) -> Reconstruction {
    let stripped = strip_markers(display_text);
    let current = ConfigDocument::parse(&stripped);
    let origins = align_headers(&current, document);
    let mut recovered = Vec::new();
    let mut unrecovered = Vec::new();

    let mut sections = current.sections().to_vec();
    for (section, origin) in sections.iter_mut().zip(origins) {
        if section.is_preamble() {
            continue;
        }

        if collapsed.contains(section.id()) {
            let Some(key) = origin else {
                // a placeholder typed by hand has nothing behind it
                tracing::error!(section = %section.id(), "collapsed section has no stored body");
                unrecovered.push(section.key());
                continue;
            };
            let source = match cache.section(&key) {
                Some(cached) => Some((cached, BodySource::Cache)),
                None => document.section(&key).map(|s| (s, BodySource::Document)),
            };
            match source {
                Some((body, kind)) => {
                    if kind == BodySource::Document {
                        tracing::warn!(section = %key.id, occurrence = key.occurrence, "no cached body; restoring last known content");
                        recovered.push(key);
                    }
                    // lines typed after the placeholder stay after the body
                    let typed: Vec<String> = section.body().to_vec();
                    let lines = section.lines_mut();
                    lines.clear();
                    lines.extend(body.lines().iter().cloned());
                    lines.extend(typed);
                }
                None => {
                    tracing::error!(section = %key.id, occurrence = key.occurrence, "collapsed section has no stored body");
                    unrecovered.push(key);
                }
            }
            continue;
        }

        let known = origin.and_then(|key| document.section(&key)).and_then(|s| s.header_line());
        if let Some(known) = known {
            if let Some(first) = section.lines_mut().first_mut() {
                *first = known.to_string();
            }
        }
    }

    Reconstruction {
        text: ConfigDocument::from_sections(sections).to_text(),
        recovered,
        unrecovered,
    }
}

/// For every section of `current`, the key of the `document` section it was
/// rendered from, if any.
///
/// Headers are matched as the longest common subsequence of their ids, taking
/// the earliest candidate on ties. Preamble slots are always `None`.
fn align_headers(current: &ConfigDocument, document: &ConfigDocument) -> Vec<Option<SectionKey>> {
    let ours: Vec<(usize, &SectionId)> = current
        .sections()
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_preamble())
        .map(|(i, s)| (i, s.id()))
        .collect();
    let theirs: Vec<&Section> = document.sections().iter().filter(|s| !s.is_preamble()).collect();
    let (n, m) = (ours.len(), theirs.len());

    // suffix lengths: table[i][j] = LCS of ours[i..] and theirs[j..]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if ours[i].1 == theirs[j].id() {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut origins = vec![None; current.len()];
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if ours[i].1 == theirs[j].id() {
            origins[ours[i].0] = Some(theirs[j].key());
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    origins
}
