//! Append-only audit file.

use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use latchkey_core::{AuditError, AuditStore};

/// Audit store backed by a text file, one record per line.
///
/// The file is opened once for appending; existing content from earlier
/// runs is kept and returned by [`AuditStore::read_all`].
#[derive(Debug)]
pub struct FileAuditStore {
    path: PathBuf,
    file: File,
}

impl FileAuditStore {
    /// Open (creating if needed) the audit file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Location of the audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStore for FileAuditStore {
    fn append(&mut self, line: &str) -> Result<(), AuditError> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    fn read_all(&self) -> Result<String, AuditError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use latchkey_core::AuditLog;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn records_are_appended_in_order() {
        let dir = TempDir::new().unwrap();
        let t0 = Instant::now();
        let store = FileAuditStore::open(dir.path().join("audit.log")).unwrap();
        let mut log = AuditLog::with_store(store, t0);

        log.record(t0 + Duration::from_millis(5), "LOCK SUCCESS: LOCAL");
        log.record(t0 + Duration::from_millis(12), "STATE REQUEST: 10.0.0.1");

        assert_eq!(log.retrieve(), "[5] LOCK SUCCESS: LOCAL\n[12] STATE REQUEST: 10.0.0.1\n");
    }

    #[test]
    fn reopening_keeps_earlier_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");

        let mut first = FileAuditStore::open(&path).unwrap();
        first.append("[1] UNLOCK SUCCESS: LOCAL\n").unwrap();
        drop(first);

        let mut second = FileAuditStore::open(&path).unwrap();
        second.append("[2]  \\_ AUTO LOCKED\n").unwrap();

        assert_eq!(second.read_all().unwrap(), "[1] UNLOCK SUCCESS: LOCAL\n[2]  \\_ AUTO LOCKED\n");
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let result = FileAuditStore::open(dir.path().join("missing").join("audit.log"));
        assert!(matches!(result, Err(AuditError::Io(_))));
    }
}
