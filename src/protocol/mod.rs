//! Wire protocol.
//!
//! Every message on the connection is one UTF-8 text frame shaped
//! `[topic][payload]`.
//!
//! | Direction | Handling |
//! |-----------|----------|
//! | Server → client | [`parse_frame`], lenient: unreadable slots become `None` |
//! | Client → server | [`OutboundFrame`], strict: both fields required |
//!
//! The topic [`topic::BROKER_ID`] is reserved for the server's connection
//! identifier announcement.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Frame parser and encoder |
//! | `topic` | Reserved topic names |

// ============================================================================
// Submodules
// ============================================================================

/// Frame parser and encoder.
pub mod frame;

/// Reserved topic names.
pub mod topic;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{Frame, OutboundFrame, encode_frame, parse_frame};
pub use topic::BROKER_ID;
