//! WebSocket session driving a connection record.
//!
//! Dials the record's URI with tokio-tungstenite and turns socket activity
//! into lifecycle callbacks on the record.
//!
//! # Event Loop
//!
//! After the handshake the session spawns a tokio task that handles:
//!
//! - Inbound text and binary frames (forwarded to `on_message`)
//! - Remote close frames and stream termination (forwarded to `on_close`)
//! - Outgoing messages from the Rust API (recorded after a successful write)

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_tungstenite::tungstenite::http::HeaderMap;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::HandleId;
use crate::record::{ConnectionRecord, Frame};

use super::close::{ABNORMAL_CLOSE, NO_STATUS};
use super::handle::TransportHandle;

// ============================================================================
// Constants
// ============================================================================

/// Default deadline for TCP + TLS + WebSocket handshake.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wait for the peer's close frame after a local close.
const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Response header carrying the server software name.
const SERVER_HEADER: &str = "Server";

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type WsSink = futures_util::stream::SplitSink<WsStream, Message>;

/// Record shared between the caller and the event loop.
pub type SharedRecord = Arc<Mutex<ConnectionRecord>>;

// ============================================================================
// SessionOptions
// ============================================================================

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Handshake deadline.
    pub connect_timeout: Duration,
    /// Wait for the peer's close frame once a local close is sent.
    pub close_timeout: Duration,
}

impl SessionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Sets the handshake deadline.
    #[inline]
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Sets the close handshake deadline.
    #[inline]
    #[must_use]
    pub const fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionHandle
// ============================================================================

/// Transport facts collected by the session for lifecycle callbacks.
#[derive(Debug, Clone)]
struct SessionHandle {
    id: HandleId,
    server: Option<String>,
    error: Option<String>,
    close_code: u16,
    close_reason: String,
}

impl SessionHandle {
    fn new(id: HandleId) -> Self {
        Self {
            id,
            server: None,
            error: None,
            close_code: NO_STATUS,
            close_reason: String::new(),
        }
    }

    fn capture_server(&mut self, headers: &HeaderMap) {
        self.server = headers
            .get(SERVER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
    }

    fn capture_close(&mut self, frame: Option<CloseFrame>) {
        match frame {
            Some(frame) => {
                self.close_code = frame.code.into();
                self.close_reason = frame.reason.as_str().to_owned();
            }
            None => {
                self.close_code = NO_STATUS;
                self.close_reason.clear();
            }
        }
    }

    fn capture_abnormal(&mut self, reason: impl Into<String>) {
        self.close_code = ABNORMAL_CLOSE;
        self.close_reason = reason.into();
    }
}

impl TransportHandle for SessionHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn response_header(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(SERVER_HEADER) {
            self.server.clone()
        } else {
            None
        }
    }

    fn error_message(&self) -> Option<String> {
        self.error.clone()
    }

    fn remote_close_code(&self) -> u16 {
        self.close_code
    }

    fn remote_close_reason(&self) -> String {
        self.close_reason.clone()
    }
}

// ============================================================================
// SessionCommand
// ============================================================================

/// Internal commands for the event loop.
enum SessionCommand {
    /// Write a text frame.
    Send {
        text: String,
        reply_tx: oneshot::Sender<Result<()>>,
    },
    /// Start the closing handshake.
    Close,
}

// ============================================================================
// Session
// ============================================================================

/// Live WebSocket session feeding a [`ConnectionRecord`].
///
/// # Example
///
/// ```ignore
/// let record = Arc::new(Mutex::new(ConnectionRecord::new(
///     ConnectionId::new(1),
///     HandleId::next(),
///     "wss://ws.kraken.com",
///     "Kraken",
///     &RecordOptions::new(),
/// )));
///
/// let session = Session::connect(Arc::clone(&record), SessionOptions::new()).await?;
/// session.send(r#"{"event":"subscribe","subscription":{"name":"ticker"}}"#).await?;
/// ```
pub struct Session {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Record updated by the event loop.
    record: SharedRecord,
    /// Event loop task.
    task: JoinHandle<()>,
}

impl Session {
    /// Connects to the record's URI and starts the event loop.
    ///
    /// The record sees `on_open` on success and `on_fail` on any failure.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUri`] if the URI is not a `ws`/`wss` URL
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds the deadline
    /// - [`Error::Connection`] if the handshake fails
    pub async fn connect(record: SharedRecord, options: SessionOptions) -> Result<Self> {
        let (uri, handle_id, tls) = {
            let record = record.lock();
            (
                record.uri().to_owned(),
                record.handle(),
                record.prepare_tls_context(),
            )
        };
        let mut handle = SessionHandle::new(handle_id);

        if let Err(e) = validate_uri(&uri) {
            handle.error = Some(e.to_string());
            record.lock().on_fail(&handle);
            return Err(e);
        }

        let connect = connect_async_tls_with_config(uri.as_str(), None, false, tls.connector());

        let ws_stream = match timeout(options.connect_timeout, connect).await {
            Ok(Ok((ws_stream, response))) => {
                handle.capture_server(response.headers());
                ws_stream
            }

            Ok(Err(e)) => {
                if let WsError::Http(response) = &e {
                    handle.capture_server(response.headers());
                }
                handle.error = Some(e.to_string());
                record.lock().on_fail(&handle);
                return Err(Error::connection(format!("WebSocket handshake failed: {e}")));
            }

            Err(_) => {
                let timeout_ms =
                    u64::try_from(options.connect_timeout.as_millis()).unwrap_or(u64::MAX);
                let e = Error::connection_timeout(timeout_ms);
                handle.error = Some(e.to_string());
                record.lock().on_fail(&handle);
                return Err(e);
            }
        };

        record.lock().on_open(&handle);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&record),
            handle,
            options.close_timeout,
        ));

        Ok(Self {
            command_tx,
            record,
            task,
        })
    }

    /// Returns the shared record.
    #[inline]
    #[must_use]
    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    /// Sends a text message and records it once written.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the event loop has ended
    /// - [`Error::WebSocket`] if the write fails
    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(SessionCommand::Send {
                text: text.into(),
                reply_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        reply_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Starts a normal closing handshake.
    ///
    /// The record moves to `Closed` when the remote end answers, or with
    /// code 1006 once [`SessionOptions::close_timeout`] passes without an
    /// answer.
    pub fn close(&self) {
        let _ = self.command_tx.send(SessionCommand::Close);
    }

    /// Waits for the event loop to finish.
    pub async fn closed(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "Session task aborted");
        }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        record: SharedRecord,
        mut handle: SessionHandle,
        close_timeout: Duration,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let mut commands_open = true;
        let mut close_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            handle.capture_close(frame);
                            record.lock().on_close(&handle);
                            let _ = ws_write.close().await;
                            break;
                        }

                        Some(Ok(message)) => {
                            if let Some(frame) = Frame::from_message(message) {
                                record.lock().on_message(&handle, frame);
                            }
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            handle.capture_abnormal(e.to_string());
                            record.lock().on_close(&handle);
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            handle.capture_abnormal("");
                            record.lock().on_close(&handle);
                            break;
                        }
                    }
                }

                () = sleep_until(close_deadline.unwrap_or_else(Instant::now)),
                    if close_deadline.is_some() =>
                {
                    warn!(timeout = ?close_timeout, "No close frame from remote");
                    handle.capture_abnormal("close handshake timed out");
                    record.lock().on_close(&handle);
                    break;
                }

                command = command_rx.recv(), if commands_open => {
                    match command {
                        Some(SessionCommand::Send { text, reply_tx }) => {
                            let result =
                                Self::handle_send_command(&text, &mut ws_write, &record).await;
                            let _ = reply_tx.send(result);
                        }

                        Some(SessionCommand::Close) => {
                            Self::send_close(&mut ws_write).await;
                            close_deadline.get_or_insert_with(|| Instant::now() + close_timeout);
                        }

                        None => {
                            debug!("Command channel closed");
                            commands_open = false;
                            Self::send_close(&mut ws_write).await;
                            close_deadline.get_or_insert_with(|| Instant::now() + close_timeout);
                        }
                    }
                }
            }
        }

        debug!("Event loop terminated");
    }

    /// Writes a text frame and records it on success.
    async fn handle_send_command(
        text: &str,
        ws_write: &mut WsSink,
        record: &SharedRecord,
    ) -> Result<()> {
        if let Err(e) = ws_write.send(Message::text(text.to_owned())).await {
            warn!(error = %e, "Failed to send message");
            return Err(Error::WebSocket(e));
        }

        record.lock().record_sent(text);
        trace!(len = text.len(), "Message sent");
        Ok(())
    }

    /// Sends a normal close frame.
    async fn send_close(ws_write: &mut WsSink) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };

        if let Err(e) = ws_write.send(Message::Close(Some(frame))).await {
            warn!(error = %e, "Failed to send close frame");
        }
    }
}

// ============================================================================
// URI Validation
// ============================================================================

/// Accepts only absolute `ws` and `wss` URLs.
fn validate_uri(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).map_err(|e| Error::invalid_uri(uri, e.to_string()))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(Error::invalid_uri(
            uri,
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::tempdir;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
    use tokio_tungstenite::tungstenite::http::HeaderValue;

    use crate::identifiers::ConnectionId;
    use crate::record::{ConnectionStatus, RecordOptions};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn shared_record(dir: &std::path::Path, uri: &str) -> SharedRecord {
        let options = RecordOptions::new().with_log_dir(dir);
        Arc::new(Mutex::new(ConnectionRecord::new(
            ConnectionId::new(1),
            HandleId::next(),
            uri,
            "Kraken",
            &options,
        )))
    }

    fn add_server_header(
        _request: &Request,
        mut response: Response,
    ) -> std::result::Result<Response, ErrorResponse> {
        response
            .headers_mut()
            .insert("Server", HeaderValue::from_static("test-exchange"));
        Ok(response)
    }

    /// Accepts one client, replays a short exchange and closes with 1000.
    async fn serve_once(listener: TcpListener) -> anyhow::Result<()> {
        let (stream, _) = listener.accept().await?;
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, add_server_header).await?;

        ws.send(Message::text(r#"{"event":"heartbeat"}"#)).await?;
        ws.send(Message::text("hello")).await?;
        ws.send(Message::binary(vec![0xde, 0xad, 0xbe, 0xef])).await?;

        // Wait for the client's subscription before closing.
        while let Some(message) = ws.next().await {
            if message?.is_text() {
                break;
            }
        }

        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))
        .await?;

        while let Some(message) = ws.next().await {
            if message.is_err() {
                break;
            }
        }
        Ok(())
    }

    /// Completes the handshake, then never reads until released.
    async fn serve_silent(
        listener: TcpListener,
        release: oneshot::Receiver<()>,
    ) -> anyhow::Result<()> {
        let (stream, _) = listener.accept().await?;
        let _ws = tokio_tungstenite::accept_async(stream).await?;
        let _ = release.await;
        Ok(())
    }

    #[test]
    fn test_validate_uri() {
        assert!(validate_uri("wss://ws.kraken.com").is_ok());
        assert!(validate_uri("ws://127.0.0.1:9000/feed").is_ok());
        assert!(matches!(
            validate_uri("https://api.kraken.com"),
            Err(Error::InvalidUri { .. })
        ));
        assert!(matches!(
            validate_uri("not a uri"),
            Err(Error::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_session_options() {
        let options = SessionOptions::new().with_connect_timeout(Duration::from_secs(5));
        assert_eq!(options.connect_timeout, Duration::from_secs(5));
        assert_eq!(SessionOptions::default().connect_timeout.as_secs(), 30);

        let options = SessionOptions::new().with_close_timeout(Duration::from_millis(250));
        assert_eq!(options.close_timeout, Duration::from_millis(250));
        assert_eq!(SessionOptions::default().close_timeout.as_secs(), 5);
    }

    #[test]
    fn test_session_handle_close_capture() {
        let mut handle = SessionHandle::new(HandleId::new(1));
        handle.capture_close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "restart".into(),
        }));
        assert_eq!(handle.remote_close_code(), 1001);
        assert_eq!(handle.remote_close_reason(), "restart");
        assert_eq!(handle.close_code_description(1001), "Going away");

        handle.capture_close(None);
        assert_eq!(handle.remote_close_code(), 1005);
        assert_eq!(handle.remote_close_reason(), "");
    }

    #[tokio::test]
    async fn test_invalid_uri_fails_record() {
        let dir = tempdir().expect("tempdir");
        let record = shared_record(dir.path(), "https://api.kraken.com");

        let result = Session::connect(Arc::clone(&record), SessionOptions::new()).await;

        assert!(matches!(result, Err(Error::InvalidUri { .. })));
        assert_eq!(record.lock().status(), ConnectionStatus::Failed);
        assert!(!record.lock().error_reason().is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection_fails_record() {
        init_tracing();
        let dir = tempdir().expect("tempdir");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let record = shared_record(dir.path(), &format!("ws://127.0.0.1:{port}"));
        let options = SessionOptions::new().with_connect_timeout(Duration::from_secs(5));

        let result = Session::connect(Arc::clone(&record), options).await;

        assert!(result.is_err());
        let record = record.lock();
        assert_eq!(record.status(), ConnectionStatus::Failed);
        assert!(!record.error_reason().is_empty());
    }

    #[tokio::test]
    async fn test_session_round_trip() -> anyhow::Result<()> {
        init_tracing();
        let dir = tempdir()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let server = tokio::spawn(serve_once(listener));

        let record = shared_record(dir.path(), &format!("ws://127.0.0.1:{port}"));
        let session = Session::connect(Arc::clone(&record), SessionOptions::new()).await?;

        assert_eq!(record.lock().status(), ConnectionStatus::Open);
        assert_eq!(record.lock().remote_server(), Some("test-exchange"));

        session.send(r#"{"event":"subscribe"}"#).await?;
        session.closed().await;
        server.await??;

        let record = record.lock();
        assert_eq!(record.status(), ConnectionStatus::Closed);
        assert_eq!(
            record.error_reason(),
            "close code: 1000 (Normal close), close reason: bye"
        );
        assert!(record.messages().iter().any(|m| m == "<< deadbeef"));
        assert!(
            record
                .messages()
                .iter()
                .any(|m| m == r#">> {"event":"subscribe"}"#)
        );

        let log = fs::read_to_string(record.log_path())?;
        assert_eq!(log.lines().count(), 1);
        assert!(log.trim_end().ends_with("<< hello"));

        Ok(())
    }

    #[tokio::test]
    async fn test_close_times_out_on_silent_peer() -> anyhow::Result<()> {
        init_tracing();
        let dir = tempdir()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let (release_tx, release_rx) = oneshot::channel();
        let server = tokio::spawn(serve_silent(listener, release_rx));

        let record = shared_record(dir.path(), &format!("ws://127.0.0.1:{port}"));
        let options = SessionOptions::new().with_close_timeout(Duration::from_millis(200));
        let session = Session::connect(Arc::clone(&record), options).await?;

        session.close();
        timeout(Duration::from_secs(3), session.closed()).await?;

        {
            let record = record.lock();
            assert_eq!(record.status(), ConnectionStatus::Closed);
            assert_eq!(
                record.error_reason(),
                "close code: 1006 (Abnormal close), close reason: close handshake timed out"
            );
        }

        let _ = release_tx.send(());
        server.await??;
        Ok(())
    }
}
