//! Bracket Broker - client-side topic broker over a framed WebSocket.
//!
//! This library keeps one persistent WebSocket connection to a broker
//! server, decodes its `[topic][payload]` text frames, and routes each
//! message to topic-scoped subscribers and an optional display surface.
//!
//! # Architecture
//!
//! ```text
//! transport frame ──► parse_frame ──► Dispatcher ──► display surface
//!                                         └────────► subscribers
//!
//! send(topic, payload) ──► state check ──► OutboundFrame ──► transport
//! ```
//!
//! Key design principles:
//!
//! - Each [`Broker`] is an independent session (no global state)
//! - Lenient inbound parsing, strict outbound validation
//! - Fire-and-forget sends: no queue, no retry, no reconnection
//! - Each subscriber callback is isolated from the others' panics
//!
//! # Quick Start
//!
//! ```no_run
//! use bracket_broker::{Broker, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let broker = Broker::builder()
//!         .url("ws://localhost:8080/ws")
//!         .connect();
//!
//!     broker.on_message("connections", |_, clients| {
//!         println!("connected clients: {clients}");
//!     })?;
//!
//!     broker.on_every_message(|topic, payload| {
//!         println!("[{topic}] {payload}");
//!     });
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`broker`] | Session, builder, and options |
//! | [`dispatch`] | Subscriber registry, filters, display surface |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Frame parser and encoder |
//! | [`transport`] | WebSocket connection |

// ============================================================================
// Modules
// ============================================================================

/// Broker session and configuration.
///
/// Use [`Broker::builder()`] to create a session.
pub mod broker;

/// Topic-filtered publish/subscribe.
pub mod dispatch;

/// Error types and result aliases.
///
/// Fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Bracket frame protocol.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Broker types
pub use broker::{Broker, BrokerBuilder, BrokerOptions, PageOrigin};

// Dispatch types
pub use dispatch::{Delivery, Dispatcher, DisplaySurface, Filter, TextBoard, TextElement};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, SubscriptionId};

// Protocol types
pub use protocol::{BROKER_ID, Frame, OutboundFrame, encode_frame, parse_frame};

// Transport types
pub use transport::{Connection, ConnectionState, Transport};
