//! Per-connection message log file.
//!
//! One file per record, opened in create/truncate mode at construction and
//! closed when the record is dropped. Lines look like:
//!
//! ```text
//! [2026-10-16 09:12:44] << {"channel":"book","data":[...]}
//! ```
//!
//! Writes go straight to the file with no explicit flush.

// ============================================================================
// Imports
// ============================================================================

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// `strftime` pattern for line prefixes.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// MessageSink
// ============================================================================

/// Exclusively owned log file for one connection.
///
/// A sink that failed to open stays disabled for its whole lifetime.
#[derive(Debug)]
pub struct MessageSink {
    /// Target path, kept for diagnostics even when disabled.
    path: PathBuf,
    /// Open file, `None` when opening failed.
    file: Option<File>,
}

impl MessageSink {
    /// Opens (creating or truncating) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkOpen`] if the file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::sink_open(&path, e))?;

        debug!(path = %path.display(), "Message log opened");

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Creates a sink that rejects every write.
    #[inline]
    #[must_use]
    pub fn disabled(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Returns `true` if the file is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Returns the log file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped inbound line using local wall-clock time.
    ///
    /// # Errors
    ///
    /// - [`Error::SinkClosed`] if the sink never opened
    /// - [`Error::SinkWrite`] if the write fails
    pub fn write_inbound(&mut self, payload: &str) -> Result<()> {
        let file = self.file.as_mut().ok_or(Error::SinkClosed)?;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);

        writeln!(file, "[{timestamp}] << {payload}").map_err(Error::SinkWrite)?;

        trace!(len = payload.len(), "Inbound message logged");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::tempdir;

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Kraken_1.txt");

        let sink = MessageSink::open(&path).expect("open should succeed");

        assert!(sink.is_open());
        assert_eq!(sink.path(), path.as_path());
        assert_eq!(fs::read_to_string(&path).expect("read"), "");
    }

    #[test]
    fn test_open_truncates_existing_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Kraken_1.txt");
        fs::write(&path, "stale contents\n").expect("write");

        let _sink = MessageSink::open(&path).expect("open should succeed");

        assert_eq!(fs::read_to_string(&path).expect("read"), "");
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("Kraken_1.txt");

        let err = MessageSink::open(&path).expect_err("open should fail");
        assert!(matches!(err, Error::SinkOpen { .. }));
    }

    #[test]
    fn test_write_line_format() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Kraken_2.txt");
        let mut sink = MessageSink::open(&path).expect("open should succeed");

        sink.write_inbound("hello").expect("write should succeed");

        let contents = fs::read_to_string(&path).expect("read");
        let line = contents.strip_suffix('\n').expect("newline terminated");
        // "[YYYY-MM-DD HH:MM:SS] << hello"
        assert_eq!(line.len(), 21 + " << hello".len());
        assert!(line.starts_with('['));
        assert_eq!(&line[20..21], "]");
        assert!(line.ends_with("] << hello"));
        assert!(chrono::NaiveDateTime::parse_from_str(&line[1..20], TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_disabled_sink_rejects_writes() {
        let mut sink = MessageSink::disabled("/nowhere/Kraken_3.txt");

        assert!(!sink.is_open());
        assert!(matches!(
            sink.write_inbound("hello"),
            Err(Error::SinkClosed)
        ));
    }
}
