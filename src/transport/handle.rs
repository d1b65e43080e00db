//! Transport-side view of a connection.
//!
//! Lifecycle callbacks receive a [`TransportHandle`] and pull whatever
//! diagnostics they need from it. The record never owns the transport.

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::HandleId;

use super::close;

// ============================================================================
// TransportHandle
// ============================================================================

/// Queries a transport must answer for one connection.
pub trait TransportHandle {
    /// Correlation token of the connection.
    fn id(&self) -> HandleId;

    /// Value of an HTTP response header from the upgrade, if any.
    fn response_header(&self, name: &str) -> Option<String>;

    /// Message for the error that failed the connection, if any.
    fn error_message(&self) -> Option<String>;

    /// Close code sent by the remote end.
    fn remote_close_code(&self) -> u16;

    /// Close reason text sent by the remote end.
    fn remote_close_reason(&self) -> String;

    /// Human-readable description of a close code.
    fn close_code_description(&self, code: u16) -> String {
        close::describe(code).to_owned()
    }
}
