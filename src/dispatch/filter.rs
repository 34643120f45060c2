//! Topic filters.
//!
//! A filter is normalized once, when a subscription is registered, into
//! either [`Filter::All`] or an exact-match topic set.
//!
//! # Example
//!
//! ```
//! use bracket_broker::Filter;
//!
//! let single = Filter::from("price");
//! let several = Filter::from(["price", "volume"]);
//!
//! assert!(single.matches("price"));
//! assert!(several.matches("volume"));
//! assert!(!several.matches("news"));
//! assert!(Filter::All.matches("broker_id"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

// ============================================================================
// Filter
// ============================================================================

/// Which topics a subscription receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    /// Every topic, including reserved ones.
    #[default]
    All,
    /// Exactly these topic names.
    Topics(FxHashSet<String>),
}

impl Filter {
    /// Creates a filter over the given topic names.
    #[must_use]
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Topics(topics.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if a delivery on `topic` passes this filter.
    #[inline]
    #[must_use]
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::All => true,
            Self::Topics(topics) => topics.contains(topic),
        }
    }

    /// Returns `true` for [`Filter::All`].
    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Rejects filters that can never match a delivery.
    ///
    /// Delivered topics are never empty, so an empty set or an empty topic
    /// name would make the subscription silently dead.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty topic set or an empty name.
    pub(crate) fn validate(&self) -> Result<()> {
        let Self::Topics(topics) = self else {
            return Ok(());
        };

        if topics.is_empty() {
            return Err(Error::invalid_argument("topic filter is empty"));
        }

        if topics.iter().any(String::is_empty) {
            return Err(Error::invalid_argument(
                "topic filter contains an empty topic name",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for Filter {
    fn from(topic: &str) -> Self {
        Self::topics([topic])
    }
}

impl From<String> for Filter {
    fn from(topic: String) -> Self {
        Self::topics([topic])
    }
}

impl From<&String> for Filter {
    fn from(topic: &String) -> Self {
        Self::topics([topic.as_str()])
    }
}

impl<const N: usize> From<[&str; N]> for Filter {
    fn from(topics: [&str; N]) -> Self {
        Self::topics(topics)
    }
}

impl From<&[&str]> for Filter {
    fn from(topics: &[&str]) -> Self {
        Self::topics(topics.iter().copied())
    }
}

impl From<Vec<&str>> for Filter {
    fn from(topics: Vec<&str>) -> Self {
        Self::topics(topics)
    }
}

impl From<Vec<String>> for Filter {
    fn from(topics: Vec<String>) -> Self {
        Self::topics(topics)
    }
}

impl From<FxHashSet<String>> for Filter {
    fn from(topics: FxHashSet<String>) -> Self {
        Self::Topics(topics)
    }
}

impl<S: Into<String>> FromIterator<S> for Filter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::topics(iter)
    }
}

// ============================================================================
// Tests
// ============================================================================
