//! Shared helpers for integration tests.
//!
//! [`TestServer`] is a single-client broker server on `127.0.0.1:0` that
//! behaves like the production one: it announces `[broker_id][Client-1]`
//! on connect, answers accepted topics with `[topic][result]`, and answers
//! unknown topics with bare error text.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bracket_broker::{Broker, ConnectionState, parse_frame};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Default wait for anything crossing the socket.
pub const WAIT: Duration = Duration::from_secs(5);

/// Identifier the test server assigns to its only client.
pub const CLIENT_ID: &str = "Client-1";

// ============================================================================
// Logging
// ============================================================================

/// Installs a test-writer subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TestServer
// ============================================================================

/// Commands pushed into the server task.
enum ServerCommand {
    /// Send a raw text frame to the client.
    Push(String),
    /// Close the socket.
    Close,
}

/// A broker server accepting one client.
pub struct TestServer {
    addr: SocketAddr,
    command_tx: mpsc::UnboundedSender<ServerCommand>,
    received: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Binds to a random localhost port and serves one client.
    pub async fn start() -> Self {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let addr = listener.local_addr().expect("local addr");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let received = Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(serve(listener, command_rx, Arc::clone(&received)));

        Self {
            addr,
            command_tx,
            received,
        }
    }

    /// Returns the WebSocket endpoint URL.
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Pushes a raw frame to the client.
    pub fn push(&self, frame: &str) {
        let _ = self.command_tx.send(ServerCommand::Push(frame.to_owned()));
    }

    /// Closes the client socket.
    pub fn close(&self) {
        let _ = self.command_tx.send(ServerCommand::Close);
    }

    /// Returns every frame received from the client so far.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Waits until the server has received `count` frames.
    pub async fn wait_received(&self, count: usize) -> Vec<String> {
        tokio::time::timeout(WAIT, async {
            loop {
                let frames = self.received();
                if frames.len() >= count {
                    return frames;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("server should receive frames")
    }
}

async fn serve(
    listener: TcpListener,
    mut command_rx: mpsc::UnboundedReceiver<ServerCommand>,
    received: Arc<Mutex<Vec<String>>>,
) {
    let Ok((stream, _)) = listener.accept().await else {
        return;
    };
    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };

    let hello = format!("[broker_id][{CLIENT_ID}]");
    if ws.send(Message::Text(hello.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            message = ws.next() => {
                let Some(Ok(Message::Text(text))) = message else {
                    break;
                };
                received.lock().push(text.as_str().to_owned());

                let reply = respond(text.as_str());
                if ws.send(Message::Text(reply.into())).await.is_err() {
                    break;
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(ServerCommand::Push(frame)) => {
                        if ws.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(ServerCommand::Close) | None => {
                        let _ = ws.close(None).await;
                        break;
                    }
                }
            }
        }
    }
}

/// Server-side handling of one client frame.
fn respond(raw: &str) -> String {
    let (Some(topic), Some(value)) = parse_frame(raw).into_parts() else {
        return format!("unexpected message format: {raw}");
    };

    match topic {
        "broker" => format!("[broker][hi from broker handler. you gave me: {value}]"),
        "move" => format!("[move][accepted {value}]"),
        "connections" => format!("[connections][{value}]"),
        _ => format!("topic not accepted: {topic}"),
    }
}

// ============================================================================
// Client helpers
// ============================================================================

/// Subscribes to everything and forwards deliveries to a channel.
pub fn collect_all(broker: &Broker) -> mpsc::UnboundedReceiver<(String, String)> {
    let (tx, rx) = mpsc::unbounded_channel();
    broker.on_every_message(move |topic, payload| {
        let _ = tx.send((topic.to_owned(), payload.to_owned()));
    });
    rx
}

/// Receives the next delivery or panics after [`WAIT`].
pub async fn next_delivery(rx: &mut mpsc::UnboundedReceiver<(String, String)>) -> (String, String) {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("delivery should arrive")
        .expect("channel open")
}

/// Waits until the broker reaches `state`.
pub async fn wait_state(broker: &Broker, state: ConnectionState) {
    tokio::time::timeout(WAIT, async {
        while broker.state() != Some(state) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("state transition");
}
