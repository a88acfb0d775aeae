//! Text styling for rendered display lines.
//!
//! - [`TextAttributes`]: bitflags for bold, italic, underline
//! - [`Style`]: foreground color plus attributes
//!
//! ```
//! use cwatm_settings::{Rgba, Style};
//!
//! let header = Style::bold();
//! let flag = Style::fg(Rgba::BLUE).with_bold();
//! let merged = header.merge(Style::fg(Rgba::RED));
//! assert_eq!(merged.fg, Some(Rgba::RED));
//! assert!(merged.attributes.contains(cwatm_settings::TextAttributes::BOLD));
//! # let _ = flag;
//! ```

use crate::color::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Text rendering attributes.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u8 {
        const BOLD      = 0x01;
        const DIM       = 0x02;
        const ITALIC    = 0x04;
        const UNDERLINE = 0x08;
    }
}

/// Foreground color and attributes applied to a span of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub attributes: TextAttributes,
}

impl Style {
    /// Style with no color and no attributes.
    pub const NONE: Self = Self {
        fg: None,
        attributes: TextAttributes::empty(),
    };

    #[must_use]
    pub const fn fg(color: Rgba) -> Self {
        Self {
            fg: Some(color),
            attributes: TextAttributes::empty(),
        }
    }

    #[must_use]
    pub const fn bold() -> Self {
        Self {
            fg: None,
            attributes: TextAttributes::BOLD,
        }
    }

    #[must_use]
    pub const fn with_fg(self, color: Rgba) -> Self {
        Self {
            fg: Some(color),
            attributes: self.attributes,
        }
    }

    #[must_use]
    pub const fn with_attributes(self, attrs: TextAttributes) -> Self {
        Self {
            fg: self.fg,
            attributes: self.attributes.union(attrs),
        }
    }

    #[must_use]
    pub const fn with_bold(self) -> Self {
        self.with_attributes(TextAttributes::BOLD)
    }

    #[must_use]
    pub const fn with_italic(self) -> Self {
        self.with_attributes(TextAttributes::ITALIC)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.attributes.is_empty()
    }

    /// Overlay `other` on top of `self`: its color wins when set, attributes
    /// are combined.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            attributes: self.attributes | other.attributes,
        }
    }
}
