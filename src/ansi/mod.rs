//! ANSI rendering of display lines.
//!
//! Used by the command-line front-end to show a highlighted display in a
//! terminal. The settings text itself never contains escape sequences.

pub mod output;
pub mod sequences;

pub use output::AnsiWriter;
pub use sequences::*;

use std::io::{self, Write};

use crate::color::Rgba;
use crate::display::Display;
use crate::highlight::{Theme, Token};
use crate::style::TextAttributes;
use crate::text::classify_view_line;

/// Color output mode for ANSI sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// True color (24-bit RGB).
    #[default]
    TrueColor,
    /// Plain text, no escape sequences at all.
    NoColor,
}

/// Write a u8 as decimal digits without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

/// Write the SGR sequence selecting `color` as foreground.
pub fn write_fg_color(w: &mut impl Write, color: Rgba, mode: ColorMode) -> io::Result<()> {
    match mode {
        ColorMode::TrueColor => {
            w.write_all(FG_RGB_PREFIX.as_bytes())?;
            write_u8_decimal(w, color.r)?;
            w.write_all(b";")?;
            write_u8_decimal(w, color.g)?;
            w.write_all(b";")?;
            write_u8_decimal(w, color.b)?;
            w.write_all(b"m")
        }
        ColorMode::NoColor => Ok(()),
    }
}

/// SGR sequence for `color`.
#[must_use]
pub fn fg_color(color: Rgba) -> String {
    format!("{FG_RGB_PREFIX}{};{};{}m", color.r, color.g, color.b)
}

/// Write the SGR sequence turning on `attrs`.
pub fn write_attributes(w: &mut impl Write, attrs: TextAttributes) -> io::Result<()> {
    let mut codes: [&str; 4] = [""; 4];
    let mut count = 0;
    for (flag, code) in [
        (TextAttributes::BOLD, "1"),
        (TextAttributes::DIM, "2"),
        (TextAttributes::ITALIC, "3"),
        (TextAttributes::UNDERLINE, "4"),
    ] {
        if attrs.contains(flag) {
            codes[count] = code;
            count += 1;
        }
    }
    if count == 0 {
        return Ok(());
    }
    w.write_all(CSI.as_bytes())?;
    for (i, code) in codes[..count].iter().enumerate() {
        if i > 0 {
            w.write_all(b";")?;
        }
        w.write_all(code.as_bytes())?;
    }
    w.write_all(b"m")
}

fn write_tokens<W: Write>(writer: &mut AnsiWriter<W>, line: &str, tokens: &[Token], theme: &Theme) {
    let mut pos = 0;
    for token in tokens {
        let Some(text) = line.get(token.range()) else {
            continue;
        };
        if token.start < pos {
            continue;
        }
        writer.set_style(theme.default_style());
        writer.write_str(&line[pos..token.start]);
        writer.set_style(theme.style_for(token.kind));
        writer.write_str(text);
        pos = token.end;
    }
    writer.set_style(theme.default_style());
    writer.write_str(&line[pos..]);
    writer.reset();
}

/// Render every line of `display` with `theme`, one line per `\n`.
pub fn render_display<W: Write>(writer: &mut AnsiWriter<W>, display: &Display, theme: &Theme) {
    for (i, line) in display.lines().iter().enumerate() {
        if i > 0 {
            writer.write_str("\n");
        }
        write_tokens(writer, &line.text(), &line.tokens(), theme);
    }
}

/// Render edited view text, classifying each line as typed.
pub fn render_view_text<W: Write>(writer: &mut AnsiWriter<W>, text: &str, theme: &Theme) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            writer.write_str("\n");
        }
        let class = classify_view_line(line);
        write_tokens(writer, line, &class.tokens, theme);
    }
}

/// Highlight `display` into a string.
#[must_use]
pub fn display_to_ansi(display: &Display, theme: &Theme, mode: ColorMode) -> String {
    let mut writer = AnsiWriter::with_color_mode(Vec::new(), mode);
    render_display(&mut writer, display, theme);
    String::from_utf8_lossy(writer.buffer()).into_owned()
}
