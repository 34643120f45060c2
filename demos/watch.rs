//! Connects to a broker server and prints every message it routes.
//!
//! Usage:
//!   cargo run --example watch -- ws://localhost:8080/ws [topic] [payload]
//!
//! With a topic and payload, one frame is published once the connection
//! opens. Set `RUST_LOG=bracket_broker=debug` to see raw frames.

use std::time::Duration;

use bracket_broker::{Broker, ConnectionState, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "ws://localhost:8080/ws".to_owned());
    let publish = args.next().zip(args.next());

    let broker = Broker::builder().url(url).connect();

    broker.on_every_message(|topic, payload| {
        println!("[{topic}] {payload}");
    });

    broker.on_message("connections", |_, clients| {
        println!("connected clients: {clients}");
    })?;

    while broker.state() == Some(ConnectionState::Connecting) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    if let Some((topic, payload)) = publish {
        broker.try_send(topic.as_str(), payload.as_str())?;
    }

    while broker.is_connected() {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = tokio::time::sleep(Duration::from_millis(200)) => {}
        }
    }

    if let Some(id) = broker.connection_id() {
        println!("session {id} ended");
    }
    broker.close();
    Ok(())
}
