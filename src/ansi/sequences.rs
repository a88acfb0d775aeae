//! Constant ANSI escape sequences.

/// Reset all attributes to default.
pub const RESET: &str = "\x1b[0m";

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

/// Truecolor foreground prefix; followed by `r;g;bm`.
pub const FG_RGB_PREFIX: &str = "\x1b[38;2;";

/// Restore the default foreground color.
pub const FG_DEFAULT: &str = "\x1b[39m";
