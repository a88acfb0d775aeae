//! `$(Section:Key)` path placeholders.
//!
//! CWatM paths refer to other settings with tokens such as
//! `$(FILE_PATHS:PathRoot)/landsurface/ldd.map`. A token without a section,
//! `$(PathRoot)`, reads the fallback section. Values may themselves contain
//! tokens, so substitution repeats for a bounded number of passes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::ConfigDocument;
use crate::highlight::split_key_value;

/// Section read by tokens that name only a key.
pub const DEFAULT_FALLBACK_SECTION: &str = "FILE_PATHS";
/// Substitution passes before giving up on nested tokens.
pub const DEFAULT_MAX_PASSES: usize = 10;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([^)]+)\)").expect("placeholder regex"));

/// A token left in the path because nothing matched it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedPlaceholder {
    /// The token as written, `$(...)` included.
    pub token: String,
    pub section: String,
    pub key: String,
}

impl fmt::Display for UnresolvedPlaceholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placeholder {} not found (section [{}], key {})",
            self.token, self.section, self.key
        )
    }
}

/// Outcome of resolving one path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub path: String,
    pub unresolved: Vec<UnresolvedPlaceholder>,
}

impl Resolution {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves placeholders against one document.
#[derive(Clone, Debug)]
pub struct PlaceholderResolver<'a> {
    doc: &'a ConfigDocument,
    fallback_section: String,
    max_passes: usize,
}

impl<'a> PlaceholderResolver<'a> {
    #[must_use]
    pub fn new(doc: &'a ConfigDocument) -> Self {
        Self {
            doc,
            fallback_section: DEFAULT_FALLBACK_SECTION.to_string(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    #[must_use]
    pub fn with_fallback_section(mut self, section: impl Into<String>) -> Self {
        self.fallback_section = section.into();
        self
    }

    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Value of `key` in the section named `section` (brackets excluded).
    ///
    /// Keys compare case-insensitively and the last assignment wins across
    /// every occurrence of the section.
    #[must_use]
    pub fn lookup(&self, section: &str, key: &str) -> Option<String> {
        self.doc
            .sections()
            .iter()
            .filter(|s| !s.is_preamble() && s.id().name() == section)
            .flat_map(|s| s.body())
            .filter_map(|line| split_key_value(line))
            .filter(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .last()
            .map(|(_, v)| v.trim().to_string())
    }

    fn split_token<'t>(&'t self, inner: &'t str) -> (&'t str, &'t str) {
        match inner.split_once(':') {
            Some((section, key)) => (section.trim(), key.trim()),
            None => (self.fallback_section.as_str(), inner.trim()),
        }
    }

    /// Substitute every token in `path` that names an existing setting.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution {
        let mut path = path.to_string();

        for pass in 0..self.max_passes {
            let tokens: Vec<String> = TOKEN
                .captures_iter(&path)
                .map(|c| c[1].to_string())
                .collect();
            if tokens.is_empty() {
                break;
            }

            let mut changed = false;
            for inner in tokens {
                let (section, key) = self.split_token(&inner);
                if let Some(value) = self.lookup(section, key) {
                    let next = path.replace(&format!("$({inner})"), &value);
                    changed |= next != path;
                    path = next;
                }
            }
            tracing::trace!(pass, changed, "placeholder pass");
            if !changed {
                break;
            }
        }

        let mut unresolved: Vec<UnresolvedPlaceholder> = Vec::new();
        for caps in TOKEN.captures_iter(&path) {
            let (section, key) = self.split_token(&caps[1]);
            let entry = UnresolvedPlaceholder {
                token: caps[0].to_string(),
                section: section.to_string(),
                key: key.to_string(),
            };
            if !unresolved.contains(&entry) {
                tracing::warn!(token = %entry.token, "unresolved placeholder left in path");
                unresolved.push(entry);
            }
        }

        Resolution { path, unresolved }
    }
}

/// Resolve `path` against settings `text` with default options.
#[must_use]
pub fn resolve_placeholders(path: &str, text: &str) -> Resolution {
    let doc = ConfigDocument::parse(text);
    PlaceholderResolver::new(&doc).resolve(path)
}
