//! WebSocket close-code descriptions.
//!
//! Human-readable names for RFC 6455 and IANA-registered close codes,
//! used when formatting a record's close reason.

// ============================================================================
// Constants
// ============================================================================

/// Code reported when the stream ended without a close frame.
pub const ABNORMAL_CLOSE: u16 = 1006;

/// Code reported when the peer sent a close frame without a status.
pub const NO_STATUS: u16 = 1005;

// ============================================================================
// Descriptions
// ============================================================================

/// Returns a human-readable description of a close code.
#[must_use]
pub const fn describe(code: u16) -> &'static str {
    match code {
        1000 => "Normal close",
        1001 => "Going away",
        1002 => "Protocol error",
        1003 => "Unsupported data",
        NO_STATUS => "No status set",
        ABNORMAL_CLOSE => "Abnormal close",
        1007 => "Invalid payload",
        1008 => "Policy violation",
        1009 => "Message too big",
        1010 => "Extension required",
        1011 => "Internal endpoint error",
        1012 => "Service restart",
        1013 => "Try again later",
        1014 => "Bad gateway",
        1015 => "TLS handshake failure",
        1016..=2999 => "Reserved",
        3000..=3999 => "Registered",
        4000..=4999 => "Application defined",
        _ => "Unknown",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_codes() {
        assert_eq!(describe(1000), "Normal close");
        assert_eq!(describe(1006), "Abnormal close");
        assert_eq!(describe(1015), "TLS handshake failure");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(describe(2000), "Reserved");
        assert_eq!(describe(3001), "Registered");
        assert_eq!(describe(4321), "Application defined");
        assert_eq!(describe(0), "Unknown");
        assert_eq!(describe(5000), "Unknown");
    }
}
