//! Connection lifecycle states.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Lifecycle state of one connection attempt.
///
/// ```text
/// Connecting ──► Open ──► Closed
///      │
///      └────► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Handshake completed.
    Open,
    /// Handshake or connection failed.
    Failed,
    /// Closed by either side.
    Closed,
}

impl ConnectionStatus {
    /// Returns `true` for states no callback can leave.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }

    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Connecting, Self::Open | Self::Failed) => true,
            (Self::Open, Self::Closed) => true,
            _ => false,
        }
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Open => "Open",
            Self::Failed => "Failed",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use ConnectionStatus::*;

    #[test]
    fn test_default_is_connecting() {
        assert_eq!(ConnectionStatus::default(), Connecting);
    }

    #[test]
    fn test_transitions() {
        assert!(Connecting.can_transition_to(Open));
        assert!(Connecting.can_transition_to(Failed));
        assert!(Open.can_transition_to(Closed));

        assert!(!Connecting.can_transition_to(Closed));
        assert!(!Open.can_transition_to(Failed));
        assert!(!Open.can_transition_to(Open));
        assert!(!Open.can_transition_to(Connecting));
        assert!(!Closed.can_transition_to(Open));
        assert!(!Failed.can_transition_to(Closed));
    }

    #[test]
    fn test_terminal() {
        assert!(Failed.is_terminal());
        assert!(Closed.is_terminal());
        assert!(!Connecting.is_terminal());
        assert!(!Open.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Connecting.to_string(), "Connecting");
        assert_eq!(Closed.to_string(), "Closed");
    }
}
