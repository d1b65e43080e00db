//! WebSocket transport layer.
//!
//! This module holds the transport side of a connection record: the
//! contract callbacks query, the TLS context factory and a tokio-tungstenite
//! session that drives a record from a live socket.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐    on_open / on_fail    ┌───────────────────┐
//! │  Session          │    on_close             │  ConnectionRecord │
//! │  (event loop)     │────────────────────────►│                   │
//! │                   │    on_message           │  status, reason,  │
//! │  tokio-tungstenite│    record_sent          │  messages, sink   │
//! └───────────────────┘                         └───────────────────┘
//!           ▲
//!           │  wss://exchange
//!           ▼
//!    Remote exchange
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `ConnectionRecord::prepare_tls_context` - Build TLS configuration
//! 2. `Session::connect` - Handshake, then `on_open` or `on_fail`
//! 3. Event loop - Frames to `on_message`, sends to `record_sent`
//! 4. Remote close, stream end or close timeout - `on_close`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `close` | Close-code descriptions |
//! | `handle` | Transport contract for lifecycle callbacks |
//! | `session` | tokio-tungstenite session and event loop |
//! | `tls` | TLS context factory |

// ============================================================================
// Submodules
// ============================================================================

/// Close-code descriptions.
pub mod close;

/// Transport contract for lifecycle callbacks.
pub mod handle;

/// WebSocket session and event loop.
pub mod session;

/// TLS context factory.
pub mod tls;

// ============================================================================
// Re-exports
// ============================================================================

pub use handle::TransportHandle;
pub use session::{Session, SessionOptions, SharedRecord};
pub use tls::TlsContext;
