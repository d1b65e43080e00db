//! Connection lifecycle tracking.
//!
//! A [`ConnectionRecord`] observes one transport connection: it follows the
//! lifecycle callbacks, keeps diagnostics, logs inbound text traffic to a
//! per-connection file and buffers binary frames and sent messages.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionRecord`] | Per-connection state and message history |
//! | [`ConnectionStatus`] | Lifecycle state |
//! | [`Frame`] | Inbound text or binary frame |
//! | [`MessageSink`] | Per-connection log file |
//! | [`RecordOptions`] | Log location and heartbeat filter |
//! | [`NameProvider`] | Exchange name used in log file names |

// ============================================================================
// Submodules
// ============================================================================

/// Connection record implementation.
pub mod core;

/// Inbound frame type.
pub mod frame;

/// Record configuration.
pub mod options;

/// Per-connection log file.
pub mod sink;

/// Lifecycle states.
pub mod status;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::ConnectionRecord;
pub use frame::Frame;
pub use options::{HEARTBEAT_SENTINEL, RecordOptions};
pub use sink::MessageSink;
pub use status::ConnectionStatus;

// ============================================================================
// NameProvider
// ============================================================================

/// Source of the exchange name used in log file names.
///
/// Implemented by whatever owns the connections; the name is used verbatim.
pub trait NameProvider {
    /// Returns the exchange name.
    fn name(&self) -> &str;
}

impl NameProvider for str {
    #[inline]
    fn name(&self) -> &str {
        self
    }
}

impl NameProvider for String {
    #[inline]
    fn name(&self) -> &str {
        self.as_str()
    }
}
