//! Bracket frame codec.
//!
//! A frame is `[topic][payload]`: two bracketed slots, no separators, no
//! escaping, no length prefix.
//!
//! # Parsing
//!
//! [`parse_frame`] is total. Each slot is read positionally at the current
//! cursor; a slot that does not start with `[` is `None` and the cursor
//! stays put, so the second slot is then checked at the same position.
//! Empty slot content is `None`. An unterminated slot keeps what it read.
//! Anything after the second slot is ignored.
//!
//! | Input | Topic | Payload |
//! |-------|-------|---------|
//! | `[one][two]` | `one` | `two` |
//! | `[][two]` | - | `two` |
//! | `foo[one][two]` | - | - |
//! | `[one]junk[two]` | `one` | - |
//! | `[one][two][x]` | `one` | `two` |
//!
//! # Encoding
//!
//! Outbound frames go through [`OutboundFrame`], which refuses missing
//! fields. Brackets inside a field are sent as-is and make the frame
//! ambiguous for the receiver.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::warn;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Slot opening delimiter.
const OPEN: char = '[';

/// Slot closing delimiter.
const CLOSE: char = ']';

// ============================================================================
// Frame
// ============================================================================

/// A decoded inbound frame.
///
/// Slots borrow from the raw text. A present slot is never empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Routing key, `None` if the first slot was missing or empty.
    pub topic: Option<&'a str>,
    /// Content, `None` if the second slot was missing or empty.
    pub payload: Option<&'a str>,
}

impl<'a> Frame<'a> {
    /// Returns the topic slot.
    #[inline]
    #[must_use]
    pub const fn topic(&self) -> Option<&'a str> {
        self.topic
    }

    /// Returns the payload slot.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> Option<&'a str> {
        self.payload
    }

    /// Returns `true` if both slots are present.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.topic.is_some() && self.payload.is_some()
    }

    /// Splits the frame into `(topic, payload)`.
    #[inline]
    #[must_use]
    pub const fn into_parts(self) -> (Option<&'a str>, Option<&'a str>) {
        (self.topic, self.payload)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Decodes one raw text frame.
///
/// Never fails; `None` stands in for any slot that cannot be read.
/// A `None` input behaves like the empty string.
///
/// # Example
///
/// ```
/// use bracket_broker::protocol::parse_frame;
///
/// let frame = parse_frame("[price][101.5]");
/// assert_eq!(frame.into_parts(), (Some("price"), Some("101.5")));
///
/// assert_eq!(parse_frame(None).into_parts(), (None, None));
/// ```
#[must_use]
pub fn parse_frame<'a>(raw: impl Into<Option<&'a str>>) -> Frame<'a> {
    let input = raw.into().unwrap_or_default();

    let (topic, rest) = take_slot(input);
    let (payload, _trailing) = take_slot(rest);

    Frame { topic, payload }
}

/// Reads one slot at the start of `input`.
///
/// Returns the slot value and the remaining input.
fn take_slot(input: &str) -> (Option<&str>, &str) {
    let Some(body) = input.strip_prefix(OPEN) else {
        return (None, input);
    };

    match body.find(CLOSE) {
        Some(end) => (non_empty(&body[..end]), &body[end + CLOSE.len_utf8()..]),
        None => (non_empty(body), ""),
    }
}

#[inline]
fn non_empty(slot: &str) -> Option<&str> {
    (!slot.is_empty()).then_some(slot)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes `[topic][payload]` without validation or escaping.
#[inline]
#[must_use]
pub fn encode_frame(topic: &str, payload: &str) -> String {
    let mut frame = String::with_capacity(topic.len() + payload.len() + 4);
    frame.push(OPEN);
    frame.push_str(topic);
    frame.push(CLOSE);
    frame.push(OPEN);
    frame.push_str(payload);
    frame.push(CLOSE);
    frame
}

// ============================================================================
// OutboundFrame
// ============================================================================

/// A validated frame ready for the wire.
///
/// Both fields are present and non-empty; an empty field would come back
/// as `None` on the receiving side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    topic: String,
    payload: String,
}

impl OutboundFrame {
    /// Validates the fields of an outbound frame.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOutboundFields`] if the topic or payload is missing
    /// or empty.
    pub fn new<'a>(
        topic: impl Into<Option<&'a str>>,
        payload: impl Into<Option<&'a str>>,
    ) -> Result<Self> {
        let topic = topic
            .into()
            .and_then(non_empty)
            .ok_or_else(|| Error::invalid_outbound_fields("topic"))?;
        let payload = payload
            .into()
            .and_then(non_empty)
            .ok_or_else(|| Error::invalid_outbound_fields("payload"))?;

        if is_ambiguous(topic) || is_ambiguous(payload) {
            warn!(
                topic,
                payload,
                "Outbound field contains brackets; frame will be ambiguous"
            );
        }

        Ok(Self {
            topic: topic.to_owned(),
            payload: payload.to_owned(),
        })
    }

    /// Returns the topic.
    #[inline]
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the wire text.
    #[inline]
    #[must_use]
    pub fn encode(&self) -> String {
        encode_frame(&self.topic, &self.payload)
    }
}

impl fmt::Display for OutboundFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OPEN}{}{CLOSE}{OPEN}{}{CLOSE}", self.topic, self.payload)
    }
}

#[inline]
fn is_ambiguous(field: &str) -> bool {
    field.contains([OPEN, CLOSE])
}

// ============================================================================
// Tests
// ============================================================================
