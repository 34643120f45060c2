//! WebSocket client connection and event loop.
//!
//! [`Connection::open`] returns immediately in the `Connecting` state and
//! spawns a tokio task that:
//!
//! - Performs the WebSocket handshake, then marks the connection `Open`
//! - Hands each inbound text frame to the frame handler, in receipt order
//! - Writes outbound frames queued by [`Connection::send_text`]
//! - Marks the connection `Closed` when the server closes, the stream
//!   fails, or [`Connection::shutdown`] is called
//!
//! There is no reconnection: a closed connection stays closed.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{ConnectionState, Transport};

// ============================================================================
// Types
// ============================================================================

/// Client WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the client stream.
type WsWrite = SplitSink<WsStream, Message>;

/// Inbound frame callback.
///
/// Called once per text frame, on the connection's event loop task.
pub type FrameHandler = Box<dyn Fn(&str) + Send + Sync>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write one text frame.
    Send(String),
    /// Close the connection.
    Shutdown,
}

// ============================================================================
// ClosedOnExit
// ============================================================================

/// Marks the shared state `Closed` when the event loop exits, including
/// when a frame handler unwinds through it.
struct ClosedOnExit(Arc<Mutex<ConnectionState>>);

impl Drop for ClosedOnExit {
    fn drop(&mut self) {
        *self.0.lock() = ConnectionState::Closed;
    }
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket client connection to the broker server.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. The event loop ends
/// once every clone is dropped.
#[derive(Clone)]
pub struct Connection {
    /// Server URL.
    url: Url,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Connection state (shared with event loop).
    state: Arc<Mutex<ConnectionState>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url.as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Opens a connection to `url`.
    ///
    /// Returns at once in [`ConnectionState::Connecting`]; the handshake
    /// runs on a spawned task. Must be called within a tokio runtime.
    pub fn open(url: Url, on_frame: FrameHandler) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ConnectionState::Connecting));

        tokio::spawn(Self::run_event_loop(
            url.clone(),
            command_rx,
            Arc::clone(&state),
            on_frame,
        ));

        debug!(url = %url, "Connection opening");

        Self {
            url,
            command_tx,
            state,
        }
    }

    /// Returns the server URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Queues one text frame for the event loop.
    ///
    /// Does not check the state; callers gate on [`Connection::state`].
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionClosed`] if the event loop has ended.
    pub fn send_text(&self, frame: String) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(frame))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Closes the connection gracefully.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        url: Url,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        state: Arc<Mutex<ConnectionState>>,
        on_frame: FrameHandler,
    ) {
        let _closed = ClosedOnExit(Arc::clone(&state));

        let ws_stream = match connect_async(url.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(e) => {
                error!(url = %url, error = %e, "WebSocket connect failed");
                return;
            }
        };

        *state.lock() = ConnectionState::Open;
        info!(url = %url, "WebSocket connected");

        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(frame = text.as_str(), "Frame received");
                            on_frame(text.as_str());
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the session
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(frame)) => {
                            if let Err(e) = Self::write_frame(&mut ws_write, frame).await {
                                warn!(error = %e, "Failed to send frame");
                                break;
                            }
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        debug!(url = %url, "Event loop terminated");
    }

    /// Writes one text frame to the socket.
    async fn write_frame(ws_write: &mut WsWrite, frame: String) -> Result<()> {
        trace!(frame = %frame, "Frame sent");
        ws_write.send(Message::Text(frame.into())).await?;
        Ok(())
    }
}

impl Transport for Connection {
    fn state(&self) -> ConnectionState {
        Connection::state(self)
    }

    fn send_text(&self, frame: String) -> Result<()> {
        Connection::send_text(self, frame)
    }

    fn shutdown(&self) {
        Connection::shutdown(self);
    }
}

// ============================================================================
// Tests
// ============================================================================
