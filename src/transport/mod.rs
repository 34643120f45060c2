//! WebSocket transport layer.
//!
//! This module owns the single bidirectional connection to the broker
//! server and exposes it to the session through the [`Transport`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Broker (Rust)  │                              │  Broker server  │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  /ws endpoint   │
//! │  → Dispatcher   │     [topic][payload] text    │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Spawn event loop, state `Connecting`
//! 2. Handshake completes - state `Open`
//! 3. Inbound frames - handed to the frame handler in receipt order
//! 4. Remote close, stream error, or `Connection::shutdown` - state `Closed`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket client and event loop |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket client connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, FrameHandler};

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Handshake in progress.
    Connecting,
    /// Frames may be sent.
    Open,
    /// Closed for good.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if frames may be sent.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

// ============================================================================
// Transport
// ============================================================================

/// A text-frame transport a broker session can run over.
///
/// The session checks [`Transport::state`] itself before every send, so
/// implementations need not reject frames while not open.
pub trait Transport: Send + Sync {
    /// Returns the current state. Must not block.
    fn state(&self) -> ConnectionState;

    /// Hands one encoded frame to the transport.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the session logs and drops the frame.
    fn send_text(&self, frame: String) -> Result<()>;

    /// Closes the transport. The default does nothing.
    fn shutdown(&self) {}
}

// ============================================================================
// Tests
// ============================================================================
