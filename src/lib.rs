//! Exchange Connection - Lifecycle tracking for exchange WebSocket connections.
//!
//! This library records what happens to each outbound WebSocket-over-TLS
//! connection of a multi-connection exchange client: lifecycle state,
//! remote server, failure or close reason, and message traffic.
//!
//! # Architecture
//!
//! - **Record (core)**: [`ConnectionRecord`] reacts to lifecycle callbacks
//!   and inbound frames; it never performs network I/O itself
//! - **Transport (collaborator)**: answers [`TransportHandle`] queries and
//!   delivers callbacks; [`Session`] does this over tokio-tungstenite
//! - **Exchange (collaborator)**: supplies its name via [`NameProvider`]
//!   and owns connection ids
//!
//! Inbound text frames are appended to `{log_dir}/{exchange}_{id}.txt`
//! (heartbeats excluded). Binary frames and sent messages stay in memory
//! and show up in the record summary.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use exchange_connection::{
//!     ConnectionId, ConnectionRecord, HandleId, RecordOptions, Result, Session, SessionOptions,
//! };
//! use parking_lot::Mutex;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let record = Arc::new(Mutex::new(ConnectionRecord::new(
//!         ConnectionId::new(1),
//!         HandleId::next(),
//!         "wss://ws.kraken.com",
//!         "Kraken",
//!         &RecordOptions::new(),
//!     )));
//!
//!     let session = Session::connect(Arc::clone(&record), SessionOptions::new()).await?;
//!     session.send(r#"{"event":"ping"}"#).await?;
//!     session.close();
//!     session.closed().await;
//!
//!     println!("{}", record.lock());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`record`] | [`ConnectionRecord`], status, frames, log sink |
//! | [`transport`] | Transport contract, TLS context, tokio-tungstenite session |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers for connections and transport handles.
pub mod identifiers;

/// Connection lifecycle tracking.
///
/// - [`ConnectionRecord`] - Per-connection state and message history
/// - [`ConnectionStatus`] - Lifecycle state
/// - [`MessageSink`] - Per-connection log file
pub mod record;

/// WebSocket transport layer.
///
/// Transport contract, TLS context factory and session event loop.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Record types
pub use record::{
    ConnectionRecord, ConnectionStatus, Frame, HEARTBEAT_SENTINEL, MessageSink, NameProvider,
    RecordOptions,
};

// Transport types
pub use transport::{Session, SessionOptions, SharedRecord, TlsContext, TransportHandle};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, HandleId};
