//! Broker session and configuration.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Broker`] | Session: connection, subscriptions, connection ID |
//! | [`BrokerBuilder`] | Fluent session builder |
//! | [`BrokerOptions`] | Transport URL configuration |
//! | [`PageOrigin`] | Hosting page origin for URL derivation |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for broker sessions.
pub mod builder;

/// Broker session implementation.
pub mod core;

/// Transport URL configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BrokerBuilder;
pub use core::Broker;
pub use options::{BrokerOptions, DEFAULT_PATH, PageOrigin};
