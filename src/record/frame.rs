//! Inbound frames as seen by a connection record.

// ============================================================================
// Imports
// ============================================================================

use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Frame
// ============================================================================

/// A data frame delivered by the transport.
///
/// Only the opcode distinction matters to the record: text goes to the
/// log file, binary is kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text frame payload.
    Text(String),
    /// Binary frame payload.
    Binary(Vec<u8>),
}

impl Frame {
    /// Creates a text frame.
    #[inline]
    #[must_use]
    pub fn text(payload: impl Into<String>) -> Self {
        Self::Text(payload.into())
    }

    /// Creates a binary frame.
    #[inline]
    #[must_use]
    pub fn binary(payload: impl Into<Vec<u8>>) -> Self {
        Self::Binary(payload.into())
    }

    /// Converts a tungstenite message.
    ///
    /// Returns `None` for control frames (ping, pong, close).
    #[must_use]
    pub fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(text) => Some(Self::Text(text.as_str().to_owned())),
            Message::Binary(data) => Some(Self::Binary(data.to_vec())),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_message() {
        let frame = Frame::from_message(Message::text("hello"));
        assert_eq!(frame, Some(Frame::text("hello")));
    }

    #[test]
    fn test_from_binary_message() {
        let frame = Frame::from_message(Message::binary(vec![0xde, 0xad]));
        assert_eq!(frame, Some(Frame::binary(vec![0xde, 0xad])));
    }

    #[test]
    fn test_control_frames_skipped() {
        assert_eq!(Frame::from_message(Message::Ping(Default::default())), None);
        assert_eq!(Frame::from_message(Message::Close(None)), None);
    }
}
