//! Error types for exchange connections.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Lifecycle callbacks on [`ConnectionRecord`](crate::ConnectionRecord) never
//! return these errors: sink and TLS failures are absorbed and logged. They
//! surface from the strict constructors and from the transport adapter:
//!
//! ```ignore
//! use exchange_connection::{ConnectionRecord, Result};
//!
//! fn example() -> Result<()> {
//!     let record = ConnectionRecord::try_new(id, handle, uri, "Kraken", &options)?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Sink | [`Error::SinkOpen`], [`Error::SinkClosed`], [`Error::SinkWrite`] |
//! | TLS | [`Error::TlsConfig`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::ConnectionTimeout`], [`Error::InvalidUri`] |
//! | External | [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Sink Errors
    // ========================================================================
    /// Log sink could not be created.
    ///
    /// Returned by the strict record constructor. The lenient constructor
    /// logs it and continues with a disabled sink.
    #[error("Failed to open message log {path}: {source}")]
    SinkOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// Write attempted on a sink that never opened.
    #[error("Error: file is not open")]
    SinkClosed,

    /// Write to an open sink failed.
    #[error("Failed to write message log: {0}")]
    SinkWrite(#[source] IoError),

    // ========================================================================
    // TLS Errors
    // ========================================================================
    /// TLS context construction failed.
    #[error("Error in TLS context: {message}")]
    TlsConfig {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt exceeded its deadline.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Session event loop is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Endpoint URI could not be parsed.
    #[error("Invalid URI {uri}: {message}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a sink open error.
    #[inline]
    pub fn sink_open(path: impl Into<PathBuf>, source: IoError) -> Self {
        Self::SinkOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a TLS configuration error.
    #[inline]
    pub fn tls_config(message: impl Into<String>) -> Self {
        Self::TlsConfig {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an invalid URI error.
    #[inline]
    pub fn invalid_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a log sink error.
    #[inline]
    #[must_use]
    pub fn is_sink_error(&self) -> bool {
        matches!(
            self,
            Self::SinkOpen { .. } | Self::SinkClosed | Self::SinkWrite(_)
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("handshake refused");
        assert_eq!(err.to_string(), "Connection failed: handshake refused");
    }

    #[test]
    fn test_sink_closed_display() {
        assert_eq!(Error::SinkClosed.to_string(), "Error: file is not open");
    }

    #[test]
    fn test_sink_open_display() {
        let err = Error::sink_open(
            "/nope/Kraken_1.txt",
            IoError::new(ErrorKind::NotFound, "missing"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to open message log /nope/Kraken_1.txt: missing"
        );
    }

    #[test]
    fn test_is_sink_error() {
        assert!(Error::SinkClosed.is_sink_error());
        assert!(Error::SinkWrite(IoError::other("disk full")).is_sink_error());
        assert!(!Error::connection("test").is_sink_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::tls_config("test").is_connection_error());
    }

    #[test]
    fn test_from_ws_error() {
        let err: Error = WsError::ConnectionClosed.into();
        assert!(matches!(err, Error::WebSocket(_)));
    }
}
