//! Connection record implementation.
//!
//! # Failure Handling
//!
//! Nothing in here returns an error to the transport. Sink failures are
//! logged and the affected message is dropped; lifecycle state and the
//! in-memory history keep working regardless.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::identifiers::{ConnectionId, HandleId};
use crate::transport::{TlsContext, TransportHandle};

use super::frame::Frame;
use super::options::RecordOptions;
use super::sink::MessageSink;
use super::status::ConnectionStatus;
use super::NameProvider;

// ============================================================================
// Constants
// ============================================================================

/// Response header naming the remote server software.
const SERVER_HEADER: &str = "Server";

/// Summary placeholder for a missing server header.
const NO_SERVER: &str = "None Specified";

/// Summary placeholder for a missing error/close reason.
const NO_REASON: &str = "N/A";

// ============================================================================
// ConnectionRecord
// ============================================================================

/// Lifecycle and traffic record for one exchange connection.
///
/// The transport drives it through [`on_open`](Self::on_open),
/// [`on_fail`](Self::on_fail), [`on_close`](Self::on_close) and
/// [`on_message`](Self::on_message); callers add outbound messages with
/// [`record_sent`](Self::record_sent).
///
/// # Thread Safety
///
/// The record does no internal locking. Share it behind a mutex when
/// callbacks may arrive from different tasks.
#[derive(Debug)]
pub struct ConnectionRecord {
    /// Exchange-assigned id.
    id: ConnectionId,
    /// Transport correlation token.
    handle: HandleId,
    /// Target endpoint.
    uri: String,
    /// Lifecycle state.
    status: ConnectionStatus,
    /// `Server` header reported by the remote end.
    remote_server: Option<String>,
    /// Failure or close description.
    error_reason: String,
    /// Sent messages and binary frames, in arrival order.
    messages: Vec<String>,
    /// Inbound text log.
    sink: MessageSink,
    /// Payload filtered from the log.
    heartbeat: String,
}

// ============================================================================
// ConnectionRecord - Constructors
// ============================================================================

impl ConnectionRecord {
    /// Creates a record and opens its log file.
    ///
    /// The log lands at `{log_dir}/{exchange}_{id}.txt`. If it cannot be
    /// opened the failure is logged and the record continues with logging
    /// disabled.
    #[must_use]
    pub fn new<N>(
        id: ConnectionId,
        handle: HandleId,
        uri: impl Into<String>,
        exchange: &N,
        options: &RecordOptions,
    ) -> Self
    where
        N: NameProvider + ?Sized,
    {
        let path = options.log_path(exchange.name(), id);

        let sink = MessageSink::open(&path).unwrap_or_else(|e| {
            error!(%id, error = %e, "Message logging disabled");
            MessageSink::disabled(path)
        });

        Self::with_sink(id, handle, uri.into(), sink, options)
    }

    /// Creates a record, failing if the log file cannot be opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkOpen`](crate::Error::SinkOpen) if the log file
    /// cannot be created.
    pub fn try_new<N>(
        id: ConnectionId,
        handle: HandleId,
        uri: impl Into<String>,
        exchange: &N,
        options: &RecordOptions,
    ) -> Result<Self>
    where
        N: NameProvider + ?Sized,
    {
        let sink = MessageSink::open(options.log_path(exchange.name(), id))?;

        Ok(Self::with_sink(id, handle, uri.into(), sink, options))
    }

    fn with_sink(
        id: ConnectionId,
        handle: HandleId,
        uri: String,
        sink: MessageSink,
        options: &RecordOptions,
    ) -> Self {
        debug!(%id, %handle, %uri, "Connection record created");

        Self {
            id,
            handle,
            uri,
            status: ConnectionStatus::Connecting,
            remote_server: None,
            error_reason: String::new(),
            messages: Vec::new(),
            sink,
            heartbeat: options.heartbeat().to_owned(),
        }
    }
}

// ============================================================================
// ConnectionRecord - Accessors
// ============================================================================

impl ConnectionRecord {
    /// Returns the transport correlation token.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the exchange-assigned id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the lifecycle state.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Returns the target endpoint.
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the remote `Server` header, if reported.
    #[inline]
    #[must_use]
    pub fn remote_server(&self) -> Option<&str> {
        self.remote_server.as_deref()
    }

    /// Returns the failure or close description; empty while live.
    #[inline]
    #[must_use]
    pub fn error_reason(&self) -> &str {
        &self.error_reason
    }

    /// Returns sent messages and binary frames in order.
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the log file path.
    #[inline]
    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.sink.path()
    }

    /// Returns `true` if the log file is open.
    #[inline]
    #[must_use]
    pub fn is_sink_open(&self) -> bool {
        self.sink.is_open()
    }
}

// ============================================================================
// ConnectionRecord - Lifecycle Callbacks
// ============================================================================

impl ConnectionRecord {
    /// Builds the TLS context for this connection's handshake.
    ///
    /// Construction errors are logged and a default context is returned.
    #[must_use]
    pub fn prepare_tls_context(&self) -> TlsContext {
        TlsContext::restricted().unwrap_or_else(|e| {
            error!(id = %self.id, error = %e, "Using default TLS context");
            TlsContext::fallback()
        })
    }

    /// Handshake completed.
    pub fn on_open(&mut self, handle: &dyn TransportHandle) {
        if !self.accept_transition(handle, ConnectionStatus::Open) {
            return;
        }

        self.remote_server = handle.response_header(SERVER_HEADER);

        info!(
            id = %self.id,
            uri = %self.uri,
            server = ?self.remote_server,
            "Connection open"
        );
    }

    /// Handshake or connection failed.
    pub fn on_fail(&mut self, handle: &dyn TransportHandle) {
        if !self.accept_transition(handle, ConnectionStatus::Failed) {
            return;
        }

        if let Some(server) = handle.response_header(SERVER_HEADER) {
            self.remote_server = Some(server);
        }
        self.error_reason = handle
            .error_message()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| "Unknown error".to_owned());

        warn!(
            id = %self.id,
            uri = %self.uri,
            reason = %self.error_reason,
            "Connection failed"
        );
    }

    /// Connection closed.
    pub fn on_close(&mut self, handle: &dyn TransportHandle) {
        if !self.accept_transition(handle, ConnectionStatus::Closed) {
            return;
        }

        let code = handle.remote_close_code();
        self.error_reason = format!(
            "close code: {code} ({}), close reason: {}",
            handle.close_code_description(code),
            handle.remote_close_reason()
        );

        info!(id = %self.id, reason = %self.error_reason, "Connection closed");
    }

    /// Inbound data frame.
    ///
    /// Text goes to the log file unless it is the heartbeat; binary is
    /// kept in memory as lowercase hex.
    pub fn on_message(&mut self, handle: &dyn TransportHandle, frame: Frame) {
        if handle.id() != self.handle {
            warn!(
                id = %self.id,
                expected = %self.handle,
                got = %handle.id(),
                "Frame for foreign handle ignored"
            );
            return;
        }

        match frame {
            Frame::Text(payload) => {
                if payload == self.heartbeat {
                    return;
                }

                if let Err(e) = self.sink.write_inbound(&payload) {
                    error!(id = %self.id, error = %e, "Inbound message dropped");
                }
            }

            Frame::Binary(payload) => {
                self.messages.push(format!("<< {}", hex::encode(payload)));
            }
        }
    }

    /// Records a message the caller wrote to the transport.
    pub fn record_sent(&mut self, message: impl AsRef<str>) {
        self.messages.push(format!(">> {}", message.as_ref()));
    }

    /// Checks handle correlation and the transition, then applies it.
    fn accept_transition(
        &mut self,
        handle: &dyn TransportHandle,
        next: ConnectionStatus,
    ) -> bool {
        if handle.id() != self.handle {
            warn!(
                id = %self.id,
                expected = %self.handle,
                got = %handle.id(),
                "Callback for foreign handle ignored"
            );
            return false;
        }

        if !self.status.can_transition_to(next) {
            warn!(id = %self.id, from = %self.status, to = %next, "Lifecycle transition ignored");
            return false;
        }

        self.status = next;
        true
    }
}

// ============================================================================
// ConnectionRecord - Summary
// ============================================================================

impl ConnectionRecord {
    /// Renders the multi-line operator summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let server = self
            .remote_server
            .as_deref()
            .filter(|server| !server.is_empty())
            .unwrap_or(NO_SERVER);
        let reason = if self.error_reason.is_empty() {
            NO_REASON
        } else {
            self.error_reason.as_str()
        };

        writeln!(f, "> URI: {}", self.uri)?;
        writeln!(f, "> Status: {}", self.status)?;
        writeln!(f, "> Remote Server: {server}")?;
        writeln!(f, "> Error/close reason: {reason}")?;
        writeln!(f, "> Messages Processed: ({})", self.messages.len())?;

        for message in &self.messages {
            writeln!(f, "{message}")?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
