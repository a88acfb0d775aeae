//! Line classification and styling for settings text.

pub mod classifier;
pub mod theme;
pub mod token;

pub use classifier::{LineClass, classify_line, is_comment, split_key_value, tokenize_line};
pub use theme::Theme;
pub use token::{LineKind, Token, TokenKind, TokenSpan};
