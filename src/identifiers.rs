//! Type-safe identifiers.
//!
//! Newtype wrappers keep subscription tokens and server-assigned
//! connection identifiers from being mixed with plain integers or strings.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// SubscriptionId
// ============================================================================

/// Token returned when a subscription is registered.
///
/// Tokens increase monotonically within a dispatcher, so they also record
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a subscription ID from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Monotonic source of [`SubscriptionId`]s.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionIdGenerator {
    next: AtomicU64,
}

impl SubscriptionIdGenerator {
    /// Returns the next unused ID.
    pub(crate) fn next(&self) -> SubscriptionId {
        SubscriptionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// ConnectionId
// ============================================================================

/// Opaque connection identifier assigned by the server.
///
/// Announced once per connection on the reserved `broker_id` topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Wraps a server-assigned identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConnectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_monotonic() {
        let generator = SubscriptionIdGenerator::default();
        let first = generator.next();
        let second = generator.next();

        assert!(first < second);
        assert_eq!(first.as_u64() + 1, second.as_u64());
    }

    #[test]
    fn test_subscription_id_display() {
        assert_eq!(SubscriptionId::new(7).to_string(), "sub-7");
    }

    #[test]
    fn test_connection_id_serializes_as_string() {
        let id = ConnectionId::new("Client-3");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"Client-3\"");
        assert_eq!(id.as_str(), "Client-3");
    }
}
