//! Type-safe identifier wrappers.
//!
//! Newtypes keep connection ids (owned by the exchange) apart from
//! transport handles (owned by the transport).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// ConnectionId
// ============================================================================

/// Exchange-assigned connection identifier.
///
/// Unique within one exchange for a process run; it names the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u32);

impl ConnectionId {
    /// Creates a connection id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ConnectionId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// HandleId
// ============================================================================

/// Source for [`HandleId::next`].
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque token correlating callbacks with a transport connection.
///
/// The token never owns the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    /// Wraps a transport-provided token.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocates a process-unique token.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hdl-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "7");
        assert_eq!(ConnectionId::from(3).as_u32(), 3);
    }

    #[test]
    fn test_handle_next_is_unique() {
        let a = HandleId::next();
        let b = HandleId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(HandleId::new(42).to_string(), "hdl-42");
    }
}
