//! Subscriber registry and message routing.
//!
//! The [`Dispatcher`] receives decoded `(topic, payload)` pairs and routes
//! them to the display surface and to every subscription whose filter
//! matches, in registration order.
//!
//! # Delivery Rules
//!
//! | Input | Display | Subscribers | Connection ID |
//! |-------|---------|-------------|---------------|
//! | missing topic or payload | - | - | - |
//! | `broker_id` | - | notified | cached after notify |
//! | any other topic | updated if element exists | notified | - |
//!
//! Each callback runs in isolation: a panicking subscriber is logged and
//! the remaining subscribers still receive the message.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::error::Result;
use crate::identifiers::{ConnectionId, SubscriptionId, SubscriptionIdGenerator};
use crate::protocol::topic;

use super::display::DisplaySurface;
use super::filter::Filter;

// ============================================================================
// Types
// ============================================================================

/// Subscriber callback.
///
/// Invoked with `(topic, payload)` for each matching delivery.
pub(crate) type MessageHandler = Box<dyn Fn(&str, &str) + Send + Sync>;

// ============================================================================
// Subscription
// ============================================================================

/// A registered `(filter, callback)` pair.
///
/// Never mutated after registration; lives as long as its dispatcher.
pub(crate) struct Subscription {
    /// Registration token.
    id: SubscriptionId,
    /// Topics this subscription receives.
    filter: Filter,
    /// Callback to invoke.
    handler: MessageHandler,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Outcome of a single [`Dispatcher::deliver`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Topic or payload missing; nothing was notified or displayed.
    Dropped,
    /// The message was routed.
    Routed {
        /// Subscribers whose callback returned normally.
        notified: usize,
        /// Subscribers whose callback panicked.
        failed: usize,
        /// Whether a display element was updated.
        displayed: bool,
    },
}

impl Delivery {
    /// Returns `true` if the message was dropped as incomplete.
    #[inline]
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    /// Returns the number of subscribers that were invoked.
    #[inline]
    #[must_use]
    pub const fn invoked(&self) -> usize {
        match self {
            Self::Dropped => 0,
            Self::Routed {
                notified, failed, ..
            } => *notified + *failed,
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes decoded messages to subscribers and the display surface.
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync`. The registry lock is released before
/// callbacks run, so a callback may subscribe; the new subscription takes
/// effect from the next delivery.
pub struct Dispatcher {
    /// Subscriptions in registration order.
    subscriptions: Mutex<Vec<Arc<Subscription>>>,
    /// Source of subscription tokens.
    ids: SubscriptionIdGenerator,
    /// Identifier from the last `broker_id` delivery.
    connection_id: Mutex<Option<ConnectionId>>,
    /// Host display surface.
    display: Option<Arc<dyn DisplaySurface>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriptions", &self.subscription_count())
            .field("connection_id", &self.connection_id())
            .field("has_display", &self.display.is_some())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Dispatcher {
    /// Creates a dispatcher with an optional display surface.
    #[must_use]
    pub fn new(display: Option<Arc<dyn DisplaySurface>>) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            ids: SubscriptionIdGenerator::default(),
            connection_id: Mutex::new(None),
            display,
        }
    }

    /// Registers a callback for the topics selected by `filter`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if the
    /// filter can never match (empty topic set or empty topic name).
    pub fn subscribe<F>(&self, filter: impl Into<Filter>, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let filter = filter.into();
        filter.validate()?;

        Ok(self.register(filter, Box::new(handler)))
    }

    /// Registers a callback for every topic, including `broker_id`.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.register(Filter::All, Box::new(handler))
    }

    /// Appends a validated subscription to the registry.
    fn register(&self, filter: Filter, handler: MessageHandler) -> SubscriptionId {
        let id = self.ids.next();
        debug!(%id, ?filter, "Subscription registered");

        self.subscriptions.lock().push(Arc::new(Subscription {
            id,
            filter,
            handler,
        }));

        id
    }

    /// Routes one decoded message.
    ///
    /// Empty strings count as missing, matching the parser's output.
    pub fn deliver(&self, topic: Option<&str>, payload: Option<&str>) -> Delivery {
        let (Some(topic), Some(payload)) = (
            topic.filter(|t| !t.is_empty()),
            payload.filter(|p| !p.is_empty()),
        ) else {
            warn!(?topic, ?payload, "Dropping incomplete message");
            return Delivery::Dropped;
        };

        if topic::is_reserved(topic) {
            let (notified, failed) = self.notify(topic, payload);
            *self.connection_id.lock() = Some(ConnectionId::new(payload));
            debug!(connection_id = payload, "Connection identifier assigned");

            return Delivery::Routed {
                notified,
                failed,
                displayed: false,
            };
        }

        let displayed = self.update_display(topic, payload);
        let (notified, failed) = self.notify(topic, payload);

        Delivery::Routed {
            notified,
            failed,
            displayed,
        }
    }

    /// Returns the cached connection identifier.
    #[must_use]
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id.lock().clone()
    }

    /// Returns the number of registered subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Writes the payload to the element keyed by `topic`, if any.
    ///
    /// A panicking surface is logged and counts as not displayed.
    fn update_display(&self, topic: &str, payload: &str) -> bool {
        let Some(display) = &self.display else {
            return false;
        };

        let write = catch_unwind(AssertUnwindSafe(|| {
            display
                .lookup_element(topic)
                .map(|element| element.set_text(payload))
                .is_some()
        }));

        match write {
            Ok(displayed) => {
                if displayed {
                    trace!(topic, "Display element updated");
                }
                displayed
            }
            Err(cause) => {
                error!(
                    topic,
                    reason = panic_message(&*cause),
                    "Display surface panicked"
                );
                false
            }
        }
    }

    /// Invokes every matching subscriber. Returns `(notified, failed)`.
    fn notify(&self, topic: &str, payload: &str) -> (usize, usize) {
        let matching: Vec<Arc<Subscription>> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|sub| sub.filter.matches(topic))
            .cloned()
            .collect();

        let mut notified = 0;
        let mut failed = 0;

        for sub in &matching {
            match catch_unwind(AssertUnwindSafe(|| (sub.handler)(topic, payload))) {
                Ok(()) => notified += 1,
                Err(cause) => {
                    failed += 1;
                    error!(
                        id = %sub.id,
                        topic,
                        reason = panic_message(&*cause),
                        "Subscriber panicked"
                    );
                }
            }
        }

        trace!(topic, notified, failed, "Message delivered");
        (notified, failed)
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Tests
// ============================================================================
