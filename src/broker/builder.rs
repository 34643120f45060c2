//! Builder pattern for broker sessions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bracket_broker::{Broker, PageOrigin, TextBoard};
//!
//! # async fn example() -> bracket_broker::Result<()> {
//! let board = Arc::new(TextBoard::with_keys(["connections", "update"]));
//!
//! let broker = Broker::builder()
//!     .origin(PageOrigin::parse("https://example.com")?)
//!     .display(board.clone())
//!     .connect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::dispatch::DisplaySurface;

use super::core::Broker;
use super::options::{BrokerOptions, PageOrigin};

// ============================================================================
// BrokerBuilder
// ============================================================================

/// Builder for configuring a [`Broker`] session.
///
/// Use [`Broker::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct BrokerBuilder {
    /// Transport options.
    options: BrokerOptions,
    /// Display surface for topic updates.
    display: Option<Arc<dyn DisplaySurface>>,
}

impl fmt::Debug for BrokerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerBuilder")
            .field("options", &self.options)
            .field("has_display", &self.display.is_some())
            .finish()
    }
}

// ============================================================================
// BrokerBuilder Implementation
// ============================================================================

impl BrokerBuilder {
    /// Creates a builder with default options and no display.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all transport options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BrokerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets an explicit transport URL.
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options = self.options.with_url(url);
        self
    }

    /// Sets the hosting page origin used to derive the URL.
    #[inline]
    #[must_use]
    pub fn origin(mut self, origin: PageOrigin) -> Self {
        self.options = self.options.with_origin(origin);
        self
    }

    /// Sets the display surface updated on each delivery.
    #[inline]
    #[must_use]
    pub fn display(mut self, display: Arc<dyn DisplaySurface>) -> Self {
        self.display = Some(display);
        self
    }

    /// Starts the session and begins connecting.
    ///
    /// Returns immediately; sends are dropped until the connection opens.
    /// If no usable URL can be resolved the session has no connection.
    /// Must be called within a tokio runtime when a URL resolves.
    #[must_use]
    pub fn connect(self) -> Broker {
        Broker::start(&self.options, self.display)
    }
}

// ============================================================================
// Tests
// ============================================================================
