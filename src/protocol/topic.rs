//! Reserved topic names.

/// Control topic on which the server announces the connection identifier.
///
/// Deliveries on this topic reach subscribers but never the display surface.
/// Application publishers must not use it.
pub const BROKER_ID: &str = "broker_id";

/// Returns `true` for topics reserved for control data.
#[inline]
#[must_use]
pub fn is_reserved(topic: &str) -> bool {
    topic == BROKER_ID
}
