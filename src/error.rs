//! Error types for the settings engine.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for engine operations.
///
/// Parsing never fails: malformed headers and lines without a value are
/// treated as plain content. Errors only come from I/O, configuration, and
/// requests that name something the document does not contain.
#[derive(Debug)]
pub enum Error {
    /// I/O error without a path attached.
    Io(io::Error),
    /// Reading a settings file failed.
    Read { path: PathBuf, source: io::Error },
    /// Writing a settings file failed.
    Write { path: PathBuf, source: io::Error },
    /// Save requested but no file was loaded and no target was given.
    NoFilePath,
    /// Section identifier not present in the current document.
    UnknownSection(String),
    /// Section cannot carry a collapse marker (the preamble).
    NotCollapsible(String),
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Engine configuration could not be parsed.
    Config(String),
    /// The external model could not be run to completion.
    Run(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Read { path, source } => {
                write!(f, "Error: cannot read {}: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "Error saving file {}: {source}", path.display())
            }
            Self::NoFilePath => write!(f, "No file path specified"),
            Self::UnknownSection(id) => write!(f, "unknown section: {id}"),
            Self::NotCollapsible(id) => write!(f, "section cannot be collapsed: {id}"),
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::Config(msg) => write!(f, "invalid engine configuration: {msg}"),
            Self::Run(msg) => write!(f, "model run failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("not-a-color".to_string());
        assert!(err.to_string().contains("invalid color format"));

        let err = Error::UnknownSection("[NOPE]".to_string());
        assert_eq!(err.to_string(), "unknown section: [NOPE]");

        assert_eq!(Error::NoFilePath.to_string(), "No file path specified");
        assert_eq!(
            Error::Run("exit status: 3".to_string()).to_string(),
            "model run failed: exit status: 3"
        );

        let err = Error::Write {
            path: PathBuf::from("/ro/settings.ini"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Error saving file"));
        assert!(msg.contains("settings.ini"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_read_error_has_source() {
        let err = Error::Read {
            path: PathBuf::from("missing.ini"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(Error::NoFilePath.source().is_none());
    }
}
