//! Topic-filtered publish/subscribe.
//!
//! Decoded messages flow through the [`Dispatcher`], which updates the
//! host's [`DisplaySurface`] and notifies matching subscriptions.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Dispatcher`] | Subscriber registry and routing |
//! | [`Filter`] | `All` or an exact topic set |
//! | [`Delivery`] | Outcome of routing one message |
//! | [`DisplaySurface`] | Host-owned keyed text elements |
//! | [`TextBoard`] | In-memory display surface |

// ============================================================================
// Submodules
// ============================================================================

/// Display surface collaborator.
pub mod display;

/// Subscriber registry and routing.
pub mod dispatcher;

/// Topic filters.
pub mod filter;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::{Delivery, Dispatcher};
pub use display::{DisplaySurface, TextBoard, TextElement};
pub use filter::Filter;
