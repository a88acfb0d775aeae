//! Boolean switches found in settings text.
//!
//! CWatM turns model components on and off with `key = True` / `key = False`
//! lines, mostly in `[OPTIONS]`. [`BoolOptions`] collects every such line once
//! per parse and is discarded on the next one.

use crate::document::{ConfigDocument, SectionId, is_section_header};
use crate::highlight::{LineKind, classify_line, is_comment};

/// Section-qualified option name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionKey {
    pub section: SectionId,
    pub key: String,
}

/// Boolean options in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoolOptions {
    entries: Vec<(OptionKey, bool)>,
}

impl BoolOptions {
    /// Collect every boolean line of every real section. A key repeated in
    /// the same section keeps its first position and its last value.
    #[must_use]
    pub fn from_document(doc: &ConfigDocument) -> Self {
        let mut options = Self::default();
        for section in doc.sections().iter().filter(|s| !s.is_preamble()) {
            for line in section.body() {
                let value = match classify_line(line) {
                    LineKind::BoolTrue => true,
                    LineKind::BoolFalse => false,
                    _ => continue,
                };
                let key = line.split_once('=').map_or("", |(k, _)| k.trim());
                options.insert(
                    OptionKey {
                        section: section.id().clone(),
                        key: key.to_string(),
                    },
                    value,
                );
            }
        }
        options
    }

    fn insert(&mut self, key: OptionKey, value: bool) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value of `key` in `section` (section matched case-insensitively).
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(k, _)| k.section.as_str().eq_ignore_ascii_case(section) && k.key == key)
            .map(|(_, v)| *v)
    }

    /// Options of one section, in document order.
    pub fn in_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = (&'a str, bool)> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.section.as_str().eq_ignore_ascii_case(section))
            .map(|(k, v)| (k.key.as_str(), *v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, bool)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite `key` inside `section` as `{indent}{key} = True|False`.
///
/// Returns the new text and whether any line matched. Lines outside the
/// section, comments, and other keys are kept verbatim.
#[must_use]
pub fn set_option_line(text: &str, section: &str, key: &str, value: bool) -> (String, bool) {
    let mut in_section = false;
    let mut matched = false;
    let literal = if value { "True" } else { "False" };

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_section_header(line) {
                in_section = line.trim().eq_ignore_ascii_case(section);
                return line.to_string();
            }
            if !in_section || is_comment(line) {
                return line.to_string();
            }
            match line.split_once('=') {
                Some((k, _)) if k.trim() == key => {
                    matched = true;
                    let indent = &line[..line.len() - line.trim_start().len()];
                    let cr = if line.ends_with('\r') { "\r" } else { "" };
                    format!("{indent}{key} = {literal}{cr}")
                }
                _ => line.to_string(),
            }
        })
        .collect();

    (lines.join("\n"), matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "[OPTIONS]\n# toggles\ntemperature = True\n  gridSizeUserDefined = False\nsnow = maybe\n[OUTPUT]\ntemperature = False\n";

    #[test]
    fn collects_section_qualified_booleans() {
        let options = BoolOptions::from_document(&ConfigDocument::parse(TEXT));
        assert_eq!(options.len(), 3);
        assert_eq!(options.get("[OPTIONS]", "temperature"), Some(true));
        assert_eq!(options.get("[options]", "gridSizeUserDefined"), Some(false));
        assert_eq!(options.get("[OUTPUT]", "temperature"), Some(false));
        assert_eq!(options.get("[OPTIONS]", "snow"), None);

        let names: Vec<&str> = options.in_section("[OPTIONS]").map(|(k, _)| k).collect();
        assert_eq!(names, ["temperature", "gridSizeUserDefined"]);
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let doc = ConfigDocument::parse("[OPTIONS]\na = True\nb = True\na = False");
        let options = BoolOptions::from_document(&doc);
        let all: Vec<(&str, bool)> = options.in_section("[OPTIONS]").collect();
        assert_eq!(all, [("a", false), ("b", true)]);
    }

    #[test]
    fn set_option_preserves_indent_and_scope() {
        let (text, matched) = set_option_line(TEXT, "[OPTIONS]", "gridSizeUserDefined", true);
        assert!(matched);
        assert!(text.contains("\n  gridSizeUserDefined = True\n"));

        let (text, matched) = set_option_line(TEXT, "[options]", "temperature", false);
        assert!(matched);
        assert!(text.starts_with("[OPTIONS]\n# toggles\ntemperature = False\n"));
        assert!(text.ends_with("[OUTPUT]\ntemperature = False\n"));
    }

    #[test]
    fn set_option_reports_missing_key() {
        let (text, matched) = set_option_line(TEXT, "[OPTIONS]", "absent", true);
        assert!(!matched);
        assert_eq!(text, TEXT);
    }
}
