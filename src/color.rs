//! RGB colors used by display themes.
//!
//! Colors only ever tint rendered lines; they never feed back into the
//! settings text. Themes are configured with hex strings, so parsing and
//! formatting hex is the main job of this module.
//!
//! ```
//! use cwatm_settings::Rgba;
//!
//! let gray = Rgba::from_hex("#a9a9a9").unwrap();
//! assert_eq!(gray, Rgba::DARK_GRAY);
//! assert_eq!(gray.to_hex(), "#a9a9a9");
//! ```

use std::fmt;

/// Opaque-or-translucent color with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// CSS `darkgray`, used for comments.
    pub const DARK_GRAY: Self = Self::rgb(169, 169, 169);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string (e.g., "#FF0000" or "FF0000").
    ///
    /// Supports 3-char (#RGB), 6-char (#RRGGBB), and 8-char (#RRGGBBAA) formats.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        match hex.len() {
            3 => {
                let r = channel(0..1)?;
                let g = channel(1..2)?;
                let b = channel(2..3)?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`, with `aa` appended when not opaque.
    #[must_use]
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_long_and_alpha_forms() {
        assert_eq!(Rgba::from_hex("#00f"), Some(Rgba::BLUE));
        assert_eq!(Rgba::from_hex("FF0000"), Some(Rgba::RED));
        assert_eq!(
            Rgba::from_hex("#00000080"),
            Some(Rgba::new(0, 0, 0, 0x80))
        );
        assert_eq!(Rgba::from_hex("  #ffffff "), Some(Rgba::WHITE));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgba::from_hex(""), None);
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#gggggg"), None);
        assert_eq!(Rgba::from_hex("#ééé"), None);
    }

    #[test]
    fn hex_output() {
        assert_eq!(Rgba::DARK_GRAY.to_hex(), "#a9a9a9");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
        assert!(Rgba::BLACK.is_opaque());
    }
}
