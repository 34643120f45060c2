//! Display surface collaborator.
//!
//! The host owns a set of text elements addressed by topic name. The
//! dispatcher looks an element up for each delivered topic and, if one
//! exists, replaces its text with the payload.
//!
//! [`TextBoard`] is an in-memory surface for headless hosts and tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

// ============================================================================
// Traits
// ============================================================================

/// A keyed collection of text elements owned by the host.
pub trait DisplaySurface: Send + Sync {
    /// Finds the element registered under `key`, if any.
    fn lookup_element(&self, key: &str) -> Option<Box<dyn TextElement + '_>>;
}

/// A single text element on a [`DisplaySurface`].
pub trait TextElement {
    /// Replaces the element's visible text.
    fn set_text(&self, text: &str);
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Arc<T> {
    fn lookup_element(&self, key: &str) -> Option<Box<dyn TextElement + '_>> {
        (**self).lookup_element(key)
    }
}

// ============================================================================
// TextBoard
// ============================================================================

/// In-memory display surface.
///
/// Only registered keys resolve to elements; writes to unknown topics are
/// skipped, the same as a page without a matching element.
///
/// # Example
///
/// ```
/// use bracket_broker::dispatch::{DisplaySurface, TextBoard, TextElement};
///
/// let board = TextBoard::new();
/// board.register("price");
///
/// board.lookup_element("price").unwrap().set_text("101.5");
/// assert_eq!(board.text("price").as_deref(), Some("101.5"));
/// assert!(board.lookup_element("volume").is_none());
/// ```
#[derive(Debug, Default)]
pub struct TextBoard {
    /// Element text by key.
    elements: Mutex<FxHashMap<String, String>>,
}

impl TextBoard {
    /// Creates an empty board.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board with elements for each key.
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let board = Self::new();
        for key in keys {
            board.register(key);
        }
        board
    }

    /// Adds an element with empty text. Existing text is kept.
    pub fn register(&self, key: impl Into<String>) {
        self.elements.lock().entry(key.into()).or_default();
    }

    /// Returns the current text of an element.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.elements.lock().get(key).cloned()
    }

    /// Returns all registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.elements.lock().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl DisplaySurface for TextBoard {
    fn lookup_element(&self, key: &str) -> Option<Box<dyn TextElement + '_>> {
        if !self.elements.lock().contains_key(key) {
            return None;
        }

        Some(Box::new(BoardElement {
            board: self,
            key: key.to_owned(),
        }))
    }
}

/// Element handle into a [`TextBoard`].
struct BoardElement<'a> {
    board: &'a TextBoard,
    key: String,
}

impl TextElement for BoardElement<'_> {
    fn set_text(&self, text: &str) {
        if let Some(slot) = self.board.elements.lock().get_mut(&self.key) {
            text.clone_into(slot);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
