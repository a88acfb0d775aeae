//! Loading and saving settings files.
//!
//! The engine itself never touches the filesystem. [`FileStore`] is the
//! collaborator that reads text in, writes clean text out, and remembers
//! which file the session belongs to.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::session::EditSession;

/// A file's content and a display name for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedFile {
    pub content: String,
    /// File name shown to the user (`settings.ini`).
    pub source_name: String,
    pub path: PathBuf,
}

/// Outcome of a successful save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub bytes: usize,
}

impl SaveReport {
    /// User-facing confirmation message.
    #[must_use]
    pub fn message(&self) -> String {
        format!("File saved: {}", self.path.display())
    }
}

/// Reads and writes settings files, tracking the current path.
#[derive(Clone, Debug, Default)]
pub struct FileStore {
    current_path: Option<PathBuf>,
}

impl FileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Read `path` as UTF-8 text. On failure nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadedFile> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        tracing::debug!(path = %path.display(), bytes = content.len(), "read settings file");
        self.current_path = Some(path.to_path_buf());
        Ok(LoadedFile {
            content,
            source_name,
            path: path.to_path_buf(),
        })
    }

    /// Write `content` verbatim to `target`, or to the current path.
    pub fn save(&mut self, content: &str, target: Option<&Path>) -> Result<SaveReport> {
        let path = match target {
            Some(path) => path.to_path_buf(),
            None => self.current_path.clone().ok_or(Error::NoFilePath)?,
        };
        fs::write(&path, content).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote settings file");
        self.current_path = Some(path.clone());
        Ok(SaveReport {
            path,
            bytes: content.len(),
        })
    }

    /// Write to a new path and make it current.
    pub fn save_as(&mut self, content: &str, path: impl AsRef<Path>) -> Result<SaveReport> {
        self.save(content, Some(path.as_ref()))
    }

    /// Load `path` into `session`.
    pub fn open_session(&mut self, session: &mut EditSession, path: impl AsRef<Path>) -> Result<()> {
        let loaded = self.load(path)?;
        session.load(&loaded.content, loaded.source_name);
        Ok(())
    }

    /// Reconstruct the session's clean text and write it. The session is
    /// only marked saved once the write succeeded.
    pub fn save_session(
        &mut self,
        session: &mut EditSession,
        target: Option<&Path>,
    ) -> Result<SaveReport> {
        let rebuilt = session.reconstruct();
        if !rebuilt.is_complete() {
            tracing::warn!(
                sections = rebuilt.unrecovered.len(),
                "saving with collapsed sections that had no stored body"
            );
        }
        let report = self.save(&rebuilt.text, target)?;
        session.mark_saved(&rebuilt.text, &report.path);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        fs::write(&path, "[OPTIONS]\nfoo = True\n").unwrap();

        let mut store = FileStore::new();
        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded.source_name, "settings.ini");
        assert_eq!(loaded.content, "[OPTIONS]\nfoo = True\n");
        assert_eq!(store.current_path(), Some(path.as_path()));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new();
        let err = store.load(dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().starts_with("Error: cannot read"));
        assert!(store.current_path().is_none());
    }

    #[test]
    fn save_without_path_fails() {
        let mut store = FileStore::new();
        assert!(matches!(store.save("x", None), Err(Error::NoFilePath)));
    }

    #[test]
    fn save_into_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new();
        let target = dir.path().join("no/such/dir/out.ini");
        let err = store.save("x", Some(&target)).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(store.current_path().is_none());
    }

    #[test]
    fn save_session_writes_clean_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        let text = "[OPTIONS]\nfoo = True\n[FILE_PATHS]\nPathRoot = /data\n";
        fs::write(&path, text).unwrap();

        let mut store = FileStore::new();
        let mut session = EditSession::new();
        store.open_session(&mut session, &path).unwrap();
        session.collapse("[OPTIONS]").unwrap();
        session.set_option("[OPTIONS]", "foo", false);

        let report = store.save_session(&mut session, None).unwrap();
        assert_eq!(report.path, path);
        assert!(report.message().contains("settings.ini"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, text.replace("True", "False"));
        assert!(!session.is_modified());
        assert!(session.is_collapsed("[OPTIONS]"));
    }
}
