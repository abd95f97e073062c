use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::entry::LogEntry;
use crate::error::Result;

/// Append-only store over the on-disk backup log.
///
/// Single-writer: only the scheduler engine appends. Reads never fail —
/// a missing or unreadable file degrades to an empty log so the scheduler
/// can proceed to a fresh launch decision instead of getting stuck.
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file (and its parent directory) if
    /// absent.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry.render())?;
        Ok(())
    }

    /// Read every parseable entry in file order.
    ///
    /// Missing file → empty vec. Unreadable file → empty vec with a warning.
    /// Malformed lines are skipped, not fatal.
    pub fn read_all(&self) -> Vec<LogEntry> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "log file does not exist yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "log file unreadable, treating as empty");
                return Vec::new();
            }
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = LogEntry::parse(line);
                if parsed.is_none() {
                    warn!(line, "skipping malformed log line");
                }
                parsed
            })
            .collect()
    }

    /// The most recent entry, if any.
    pub fn last_entry(&self) -> Option<LogEntry> {
        self.read_all().pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Outcome, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("delorean.log"));
        assert!(store.read_all().is_empty());
        assert!(store.last_entry().is_none());
    }

    #[test]
    fn append_creates_file_and_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("nested/delorean.log"));

        store
            .append(&LogEntry::new(ts("2026-08-07 14:30:00"), Outcome::Success))
            .unwrap();

        let entries = store.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, Outcome::Success);
    }

    #[test]
    fn entries_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("delorean.log"));

        store
            .append(&LogEntry::new(
                ts("2026-08-06 14:00:00"),
                Outcome::NetworkUnreachable,
            ))
            .unwrap();
        store
            .append(&LogEntry::new(ts("2026-08-07 14:00:00"), Outcome::Success))
            .unwrap();

        let entries = store.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, Outcome::NetworkUnreachable);
        assert_eq!(
            store.last_entry().unwrap().timestamp,
            ts("2026-08-07 14:00:00")
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delorean.log");
        std::fs::write(
            &path,
            "garbage\n2026-08-07 14:00:00 - Backup completed successfully\n\n",
        )
        .unwrap();

        let store = LogStore::new(&path);
        let entries = store.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, Outcome::Success);
    }
}
