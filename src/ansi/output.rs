//! Buffered ANSI output writer with style tracking.

use std::io::{self, Write};

use crate::ansi::{self, ColorMode};
use crate::color::Rgba;
use crate::style::{Style, TextAttributes};

/// Buffered writer that tracks the active style to minimize escape sequences.
pub struct AnsiWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
    color_mode: ColorMode,
    current_fg: Option<Rgba>,
    current_attrs: TextAttributes,
}

impl<W: Write> AnsiWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_color_mode(writer, ColorMode::TrueColor)
    }

    pub fn with_color_mode(writer: W, color_mode: ColorMode) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(4096),
            color_mode,
            current_fg: None,
            current_attrs: TextAttributes::empty(),
        }
    }

    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
    }

    /// Switch to `style`, only writing what changed.
    pub fn set_style(&mut self, style: Style) {
        if self.color_mode == ColorMode::NoColor {
            return;
        }
        if self.current_fg != style.fg {
            let _ = match style.fg {
                Some(color) => ansi::write_fg_color(&mut self.buffer, color, self.color_mode),
                None => self.buffer.write_all(ansi::FG_DEFAULT.as_bytes()),
            };
            self.current_fg = style.fg;
        }
        self.set_attributes(style.attributes);
    }

    fn set_attributes(&mut self, attrs: TextAttributes) {
        if self.current_attrs == attrs {
            return;
        }
        let removed = self.current_attrs - attrs;
        if !removed.is_empty() {
            let mut codes = Vec::new();
            if removed.intersects(TextAttributes::BOLD | TextAttributes::DIM) {
                codes.push("22");
            }
            if removed.contains(TextAttributes::ITALIC) {
                codes.push("23");
            }
            if removed.contains(TextAttributes::UNDERLINE) {
                codes.push("24");
            }
            self.write_str(ansi::CSI);
            self.write_str(&codes.join(";"));
            self.write_str("m");
            // 22 clears both bold and dim
            self.current_attrs -= removed;
            if removed.intersects(TextAttributes::BOLD | TextAttributes::DIM) {
                self.current_attrs -= TextAttributes::BOLD | TextAttributes::DIM;
            }
        }
        let to_add = attrs - self.current_attrs;
        if !to_add.is_empty() {
            let _ = ansi::write_attributes(&mut self.buffer, to_add);
        }
        self.current_attrs = attrs;
    }

    /// Reset all attributes.
    pub fn reset(&mut self) {
        if self.color_mode == ColorMode::NoColor {
            return;
        }
        if self.current_fg.is_some() || !self.current_attrs.is_empty() {
            self.write_str(ansi::RESET);
        }
        self.current_fg = None;
        self.current_attrs = TextAttributes::empty();
    }

    /// Flush the buffer to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.write_all(&self.buffer)?;
        self.buffer.clear();
        self.writer.flush()
    }

    /// Bytes written since the last flush.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
