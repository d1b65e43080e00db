//! Record configuration.
//!
//! Controls where per-connection log files land and which keep-alive
//! payload is filtered out of them.
//!
//! # Example
//!
//! ```ignore
//! use exchange_connection::RecordOptions;
//!
//! let options = RecordOptions::new()
//!     .with_log_dir("/var/log/exchange")
//!     .with_heartbeat(r#"{"op":"pong"}"#);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::fmt::Display;
use std::path::PathBuf;

use tracing::warn;

// ============================================================================
// Constants
// ============================================================================

/// Keep-alive payload that is never logged.
pub const HEARTBEAT_SENTINEL: &str = r#"{"event":"heartbeat"}"#;

// ============================================================================
// RecordOptions
// ============================================================================

/// Configuration for a [`ConnectionRecord`](super::ConnectionRecord).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOptions {
    /// Directory for log files. `None` resolves to the working directory.
    pub log_dir: Option<PathBuf>,

    /// Heartbeat payload override. `None` uses [`HEARTBEAT_SENTINEL`].
    pub heartbeat: Option<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl RecordOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log_dir: None,
            heartbeat: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RecordOptions {
    /// Sets the directory log files are written to.
    #[inline]
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Sets the heartbeat payload to filter.
    #[inline]
    #[must_use]
    pub fn with_heartbeat(mut self, payload: impl Into<String>) -> Self {
        self.heartbeat = Some(payload.into());
        self
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl RecordOptions {
    /// Returns the heartbeat payload in effect.
    #[inline]
    #[must_use]
    pub fn heartbeat(&self) -> &str {
        self.heartbeat.as_deref().unwrap_or(HEARTBEAT_SENTINEL)
    }

    /// Resolves the log directory.
    ///
    /// Falls back to `.` if the working directory cannot be read.
    #[must_use]
    pub fn resolve_log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }

        env::current_dir().unwrap_or_else(|e| {
            warn!(error = %e, "Cannot read working directory, using '.'");
            PathBuf::from(".")
        })
    }

    /// Builds `{log_dir}/{exchange}_{id}.txt`.
    #[must_use]
    pub fn log_path(&self, exchange: &str, id: impl Display) -> PathBuf {
        self.resolve_log_dir().join(format!("{exchange}_{id}.txt"))
    }
}

// ============================================================================
// Tests
// ============================================================================
