//! Append-only audit log.
//!
//! Every record goes to the live console stream (a `tracing` event on the
//! `latchkey::audit` target) and, when durable storage is available, to an
//! [`AuditStore`]. Storage is best effort: a failed write is logged and
//! dropped, never surfaced to the lock logic.
//!
//! Stored lines have the form `[<ms since start>] <message>\n`.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Instant,
};

use tracing::{info, warn};

use crate::error::AuditError;

/// Message recorded when durable storage could not be opened.
pub const STORAGE_UNAVAILABLE: &str = "Unable to open audit storage. Logging to console.";

/// Durable, append-only audit storage.
pub trait AuditStore: Send {
    /// Append one complete line (including the trailing newline).
    fn append(&mut self, line: &str) -> Result<(), AuditError>;

    /// Full accumulated content.
    fn read_all(&self) -> Result<String, AuditError>;
}

/// A single audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Milliseconds since the log was started.
    pub timestamp_ms: u128,
    /// Free-text message.
    pub message: String,
}

impl AuditRecord {
    /// Stored line for this record, newline terminated.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp_ms, self.message)
    }
}

/// Audit sink with console fallback.
#[derive(Debug)]
pub struct AuditLog<S> {
    store: Option<S>,
    started: Instant,
}

impl<S: AuditStore> AuditLog<S> {
    /// Log backed by durable storage.
    pub fn with_store(store: S, started: Instant) -> Self {
        Self { store: Some(store), started }
    }

    /// Console-only log, used when storage could not be opened.
    ///
    /// Records the fallback once, at `started`.
    pub fn console_only(started: Instant) -> Self {
        let mut log = Self { store: None, started };
        log.record(started, STORAGE_UNAVAILABLE);
        log
    }

    /// Whether durable storage is attached.
    pub fn is_durable(&self) -> bool {
        self.store.is_some()
    }

    /// Append a record.
    pub fn record(&mut self, now: Instant, message: impl Into<String>) -> AuditRecord {
        let record = AuditRecord {
            timestamp_ms: now.saturating_duration_since(self.started).as_millis(),
            message: message.into(),
        };
        info!(target: "latchkey::audit", "{record}");

        if let Some(store) = self.store.as_mut()
            && let Err(error) = store.append(&record.to_line())
        {
            warn!(%error, "audit record not persisted");
        }
        record
    }

    /// Everything recorded so far, or empty if storage is unavailable.
    pub fn retrieve(&self) -> String {
        let Some(store) = self.store.as_ref() else {
            return String::new();
        };
        match store.read_all() {
            Ok(content) => content,
            Err(error) => {
                warn!(%error, "audit log could not be read");
                String::new()
            },
        }
    }
}

/// In-memory store. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryAuditStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored lines, without trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().map(|l| l.trim_end_matches('\n').to_string()).collect())
            .unwrap_or_default()
    }

    /// Messages only, with the `[ts] ` prefix stripped.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| match line.split_once("] ") {
                Some((_, message)) => message.to_string(),
                None => line,
            })
            .collect()
    }
}

impl AuditStore for MemoryAuditStore {
    fn append(&mut self, line: &str) -> Result<(), AuditError> {
        self.lines
            .lock()
            .map_err(|e| AuditError::Unavailable(e.to_string()))?
            .push(line.to_string());
        Ok(())
    }

    fn read_all(&self) -> Result<String, AuditError> {
        let lines = self.lines.lock().map_err(|e| AuditError::Unavailable(e.to_string()))?;
        Ok(lines.concat())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct BrokenStore;

    impl AuditStore for BrokenStore {
        fn append(&mut self, _line: &str) -> Result<(), AuditError> {
            Err(AuditError::Io(std::io::Error::other("disk full")))
        }

        fn read_all(&self) -> Result<String, AuditError> {
            Err(AuditError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn records_are_timestamped_from_start() {
        let t0 = Instant::now();
        let store = MemoryAuditStore::new();
        let mut log = AuditLog::with_store(store.clone(), t0);

        log.record(t0 + Duration::from_millis(1234), "LOCK SUCCESS: LOCAL");

        assert_eq!(store.lines(), vec!["[1234] LOCK SUCCESS: LOCAL"]);
        assert_eq!(log.retrieve(), "[1234] LOCK SUCCESS: LOCAL\n");
    }

    #[test]
    fn retrieve_preserves_arrival_order() {
        let t0 = Instant::now();
        let mut log = AuditLog::with_store(MemoryAuditStore::new(), t0);
        log.record(t0, "first");
        log.record(t0, "second");
        log.record(t0 + Duration::from_millis(5), "third");

        assert_eq!(log.retrieve(), "[0] first\n[0] second\n[5] third\n");
    }

    #[test]
    fn console_only_retrieves_nothing() {
        let t0 = Instant::now();
        let mut log = AuditLog::<MemoryAuditStore>::console_only(t0);
        assert!(!log.is_durable());

        let record = log.record(t0, "UNLOCK SUCCESS: LOCAL");
        assert_eq!(record.message, "UNLOCK SUCCESS: LOCAL");
        assert_eq!(log.retrieve(), "");
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let t0 = Instant::now();
        let mut log = AuditLog::with_store(BrokenStore, t0);

        let record = log.record(t0, "LOCK SUCCESS: LOCAL");
        assert_eq!(record.to_string(), "[0] LOCK SUCCESS: LOCAL");
        assert_eq!(log.retrieve(), "");
    }
}
