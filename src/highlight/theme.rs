use crate::color::Rgba;
use crate::highlight::token::TokenKind;
use crate::style::Style;

/// Maps token kinds to styles for rendering display lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    name: String,
    styles: [Option<Style>; TokenKind::COUNT],
    default_style: Style,
}

impl Theme {
    /// Create a theme with no per-kind styles.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            styles: [None; TokenKind::COUNT],
            default_style: Style::NONE,
        }
    }

    /// Colors of the desktop editor: blue `True` and markers, red `False`,
    /// gray comments, bold headers.
    #[must_use]
    pub fn classic() -> Self {
        Self::new("classic")
            .with_default_style(Style::fg(Rgba::BLACK))
            .with_style(TokenKind::Marker, Style::fg(Rgba::BLUE))
            .with_style(TokenKind::SectionHeader, Style::bold())
            .with_style(TokenKind::Comment, Style::fg(Rgba::DARK_GRAY))
            .with_style(TokenKind::BoolTrue, Style::fg(Rgba::BLUE).with_bold())
            .with_style(TokenKind::BoolFalse, Style::fg(Rgba::RED).with_bold())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the style for a token kind (falls back to default style).
    #[must_use]
    pub fn style_for(&self, kind: TokenKind) -> Style {
        self.styles[kind.as_usize()].unwrap_or(self.default_style)
    }

    #[must_use]
    pub const fn default_style(&self) -> Style {
        self.default_style
    }

    pub fn set_style(&mut self, kind: TokenKind, style: Style) -> &mut Self {
        self.styles[kind.as_usize()] = Some(style);
        self
    }

    #[must_use]
    pub fn with_style(mut self, kind: TokenKind, style: Style) -> Self {
        self.set_style(kind, style);
        self
    }

    #[must_use]
    pub fn with_default_style(mut self, style: Style) -> Self {
        self.default_style = style;
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
