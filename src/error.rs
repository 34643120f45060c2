//! Error types for the broker client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use bracket_broker::{Broker, Result};
//!
//! fn publish(broker: &Broker) -> Result<()> {
//!     broker.try_send("move", "X5")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | Registration | [`Error::InvalidArgument`] |
//! | Send path | [`Error::NotConnected`], [`Error::InvalidOutboundFields`] |
//! | Connection | [`Error::ConnectionClosed`] |
//! | External | [`Error::Json`], [`Error::WebSocket`] |
//!
//! Malformed and incomplete inbound frames never surface here: the parser
//! substitutes `None` for unreadable slots and the dispatcher drops
//! incomplete messages after logging them.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::transport::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when broker options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ========================================================================
    // Registration Errors
    // ========================================================================
    /// Invalid argument at subscription time.
    ///
    /// Returned when a subscription could never receive a delivery.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Send Path Errors
    // ========================================================================
    /// Send attempted without an open connection.
    #[error("Not connected (state: {state})")]
    NotConnected {
        /// Connection state at the time of the send, `None` if no
        /// connection was ever created.
        state: DisplayState,
    },

    /// Send attempted with a missing topic or payload.
    #[error("Invalid outbound frame: missing {field}")]
    InvalidOutboundFields {
        /// Name of the first missing field.
        field: &'static str,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection event loop is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// DisplayState
// ============================================================================

/// Optional connection state, printable inside error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState(pub Option<ConnectionState>);

impl std::fmt::Display for DisplayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(state) => write!(f, "{state}"),
            None => f.write_str("no connection"),
        }
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not connected error.
    #[inline]
    pub fn not_connected(state: Option<ConnectionState>) -> Self {
        Self::NotConnected {
            state: DisplayState(state),
        }
    }

    /// Creates an invalid outbound fields error.
    #[inline]
    pub fn invalid_outbound_fields(field: &'static str) -> Self {
        Self::InvalidOutboundFields { field }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::NotConnected { .. } | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the error only means one outbound frame was dropped.
    ///
    /// These are the errors `Broker::send` logs and swallows.
    #[inline]
    #[must_use]
    pub fn is_dropped_send(&self) -> bool {
        matches!(
            self,
            Self::NotConnected { .. } | Self::InvalidOutboundFields { .. } | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
