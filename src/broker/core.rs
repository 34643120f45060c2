//! Broker session.
//!
//! A [`Broker`] owns everything one client session needs: the subscriber
//! registry, the cached connection identifier, and at most one transport
//! connection. Sessions are independent; nothing is global.
//!
//! # Message Flow
//!
//! ```text
//! inbound:  transport frame → parse_frame → Dispatcher::deliver
//! outbound: send(topic, payload) → state check → OutboundFrame → transport
//! ```
//!
//! # Example
//!
//! ```no_run
//! use bracket_broker::Broker;
//!
//! # async fn example() -> bracket_broker::Result<()> {
//! let broker = Broker::builder().url("ws://localhost:8080/ws").connect();
//!
//! broker.on_message(["update", "connections"], |topic, payload| {
//!     println!("{topic} = {payload}");
//! })?;
//!
//! // Dropped with a warning until the connection is open.
//! broker.send("start", "game-1");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::dispatch::{Delivery, Dispatcher, DisplaySurface, Filter};
use crate::error::{Error, Result};
use crate::identifiers::{ConnectionId, SubscriptionId};
use crate::protocol::{OutboundFrame, parse_frame};
use crate::transport::{Connection, ConnectionState, Transport};

use super::builder::BrokerBuilder;
use super::options::BrokerOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a broker session.
struct BrokerInner {
    /// Session identifier for logging.
    uuid: Uuid,
    /// Subscriber registry and routing.
    dispatcher: Arc<Dispatcher>,
    /// Transport, `None` if no usable URL was configured.
    transport: Option<Arc<dyn Transport>>,
}

// ============================================================================
// Broker
// ============================================================================

/// A client broker session.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<BrokerInner>,
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("uuid", &self.inner.uuid)
            .field("state", &self.state())
            .field("connection_id", &self.connection_id())
            .field("subscriptions", &self.inner.dispatcher.subscription_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Broker - Constructors
// ============================================================================

impl Broker {
    /// Creates a builder for a new session.
    #[inline]
    #[must_use]
    pub fn builder() -> BrokerBuilder {
        BrokerBuilder::new()
    }

    /// Starts a session without a display surface.
    ///
    /// See [`BrokerBuilder::connect`].
    #[must_use]
    pub fn initialize(options: &BrokerOptions) -> Self {
        Self::start(options, None)
    }

    /// Starts a session over a caller-provided transport.
    ///
    /// Inbound frames are fed in with [`Broker::receive`].
    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        display: Option<Arc<dyn DisplaySurface>>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(display));
        Self::from_parts(dispatcher, Some(transport))
    }

    /// Resolves the URL and opens the WebSocket connection.
    ///
    /// With no usable URL the session has no connection and every send is
    /// dropped.
    pub(crate) fn start(
        options: &BrokerOptions,
        display: Option<Arc<dyn DisplaySurface>>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(display));

        let Some(url) = options.resolve_url() else {
            warn!("No usable transport URL, broker has no connection");
            return Self::from_parts(dispatcher, None);
        };

        info!(url = %url, "Using transport URL");

        let frame_dispatcher = Arc::clone(&dispatcher);
        let connection = Connection::open(
            url,
            Box::new(move |raw| {
                route_frame(&frame_dispatcher, raw);
            }),
        );

        Self::from_parts(dispatcher, Some(Arc::new(connection)))
    }

    fn from_parts(dispatcher: Arc<Dispatcher>, transport: Option<Arc<dyn Transport>>) -> Self {
        let uuid = Uuid::new_v4();
        debug!(uuid = %uuid, connected = transport.is_some(), "Broker session created");

        Self {
            inner: Arc::new(BrokerInner {
                uuid,
                dispatcher,
                transport,
            }),
        }
    }
}

// ============================================================================
// Broker - Accessors
// ============================================================================

impl Broker {
    /// Returns the session UUID.
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.inner.uuid
    }

    /// Returns the transport state, `None` if there is no connection.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<ConnectionState> {
        self.inner.transport.as_ref().map(|t| t.state())
    }

    /// Returns `true` if frames can be sent right now.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_some_and(ConnectionState::is_open)
    }

    /// Returns the identifier announced on `broker_id`, if any yet.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.inner.dispatcher.connection_id()
    }

    /// Returns the session's dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

// ============================================================================
// Broker - Subscriptions
// ============================================================================

impl Broker {
    /// Subscribes to the topics selected by `filter`.
    ///
    /// `filter` may be a single topic, an array, slice, or vector of topics,
    /// or [`Filter::All`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the filter can never match.
    pub fn on_message<F>(&self, filter: impl Into<Filter>, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.inner.dispatcher.subscribe(filter, handler)
    }

    /// Subscribes to every topic.
    pub fn on_every_message<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.inner.dispatcher.subscribe_all(handler)
    }
}

// ============================================================================
// Broker - Messaging
// ============================================================================

impl Broker {
    /// Sends `[topic][payload]`, fire-and-forget.
    ///
    /// Without an open connection, or with a missing field, the frame is
    /// logged and dropped. There is no queue and no retry.
    pub fn send<'a>(&self, topic: impl Into<Option<&'a str>>, payload: impl Into<Option<&'a str>>) {
        match self.try_send(topic, payload) {
            Ok(()) => {}
            Err(e @ Error::InvalidOutboundFields { .. }) => {
                error!(error = %e, "Outbound frame dropped");
            }
            Err(e) => {
                warn!(error = %e, "Outbound frame dropped");
            }
        }
    }

    /// Sends `[topic][payload]`, reporting why a frame was dropped.
    ///
    /// The connection state is checked before the fields.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if there is no open connection
    /// - [`Error::InvalidOutboundFields`] if the topic or payload is missing
    /// - [`Error::ConnectionClosed`] if the transport refused the frame
    pub fn try_send<'a>(
        &self,
        topic: impl Into<Option<&'a str>>,
        payload: impl Into<Option<&'a str>>,
    ) -> Result<()> {
        let Some(transport) = &self.inner.transport else {
            return Err(Error::not_connected(None));
        };

        let state = transport.state();
        if !state.is_open() {
            return Err(Error::not_connected(Some(state)));
        }

        let frame = OutboundFrame::new(topic, payload)?;
        transport.send_text(frame.encode())?;

        trace!(topic = frame.topic(), "Frame queued");
        Ok(())
    }

    /// Parses and routes one inbound frame.
    ///
    /// Connections opened by the session call this internally; custom
    /// transports call it once per received frame, in receipt order.
    pub fn receive(&self, raw: &str) -> Delivery {
        route_frame(&self.inner.dispatcher, raw)
    }

    /// Closes the connection, if any.
    ///
    /// Later sends are dropped. Never called implicitly.
    pub fn close(&self) {
        if let Some(transport) = &self.inner.transport {
            debug!(uuid = %self.inner.uuid, "Closing broker connection");
            transport.shutdown();
        }
    }
}

/// Parse-then-deliver for one inbound frame.
fn route_frame(dispatcher: &Dispatcher, raw: &str) -> Delivery {
    debug!(frame = raw, "From server");
    let frame = parse_frame(raw);
    dispatcher.deliver(frame.topic(), frame.payload())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::dispatch::TextBoard;

    /// In-process transport that records sent frames.
    struct RecordingTransport {
        state: Mutex<ConnectionState>,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        fn new(state: ConnectionState) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn state(&self) -> ConnectionState {
            *self.state.lock()
        }

        fn send_text(&self, frame: String) -> Result<()> {
            self.sent.lock().push(frame);
            Ok(())
        }

        fn shutdown(&self) {
            *self.state.lock() = ConnectionState::Closed;
        }
    }

    fn broker_over(transport: &Arc<RecordingTransport>) -> Broker {
        Broker::with_transport(transport.clone(), None)
    }

    #[test]
    fn test_send_encodes_frame() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);

        broker.send("move", "X5");

        assert_eq!(transport.sent(), vec!["[move][X5]"]);
    }

    #[test]
    fn test_send_without_connection_is_dropped() {
        let broker = Broker::initialize(&BrokerOptions::new());

        assert_eq!(broker.state(), None);
        assert!(!broker.is_connected());
        broker.send("t", "p");
        assert!(matches!(
            broker.try_send("t", "p"),
            Err(Error::NotConnected { .. })
        ));
    }

    #[test]
    fn test_send_while_connecting_is_dropped() {
        let transport = RecordingTransport::new(ConnectionState::Connecting);
        let broker = broker_over(&transport);

        broker.send("t", "p");

        assert!(transport.sent().is_empty());
        let err = broker.try_send("t", "p").unwrap_err();
        assert_eq!(err.to_string(), "Not connected (state: connecting)");
    }

    #[test]
    fn test_send_after_close_is_dropped() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);

        broker.close();
        broker.send("t", "p");

        assert_eq!(broker.state(), Some(ConnectionState::Closed));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_send_missing_fields_is_dropped() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);

        broker.send("t", None);
        broker.send(None, "p");
        broker.send("", "p");

        assert!(transport.sent().is_empty());
        assert!(matches!(
            broker.try_send("t", None),
            Err(Error::InvalidOutboundFields { field: "payload" })
        ));
    }

    #[test]
    fn test_state_checked_before_fields() {
        let transport = RecordingTransport::new(ConnectionState::Closed);
        let broker = broker_over(&transport);

        assert!(matches!(
            broker.try_send(None, None),
            Err(Error::NotConnected { .. })
        ));
    }

    #[test]
    fn test_receive_routes_to_subscribers_and_display() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let board = Arc::new(TextBoard::with_keys(["update"]));
        let broker = Broker::with_transport(transport, Some(board.clone()));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        broker
            .on_message("update", move |topic, payload| {
                sink.lock().push(format!("{topic}={payload}"));
            })
            .expect("subscribe");

        let delivery = broker.receive("[update][game-1,X,-,-,-,-,-,-,-,-,O,?,1]");

        assert_eq!(delivery.invoked(), 1);
        assert_eq!(
            board.text("update").as_deref(),
            Some("game-1,X,-,-,-,-,-,-,-,-,O,?,1")
        );
        assert_eq!(seen.lock().as_slice(), &["update=game-1,X,-,-,-,-,-,-,-,-,O,?,1"]);
    }

    #[test]
    fn test_receive_malformed_frame_is_dropped() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        broker.on_every_message(move |_, _| *counter.lock() += 1);

        assert!(broker.receive("topic not accepted: foo").is_dropped());
        assert!(broker.receive("[only]").is_dropped());
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_receive_broker_id_sets_connection_id() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);

        assert_eq!(broker.connection_id(), None);
        broker.receive("[broker_id][Client-4]");
        assert_eq!(broker.connection_id(), Some(ConnectionId::new("Client-4")));
    }

    #[test]
    fn test_on_message_rejects_empty_filter() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);

        let empty: &[&str] = &[];
        let err = broker.on_message(empty, |_, _| {}).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_clones_share_session() {
        let transport = RecordingTransport::new(ConnectionState::Open);
        let broker = broker_over(&transport);
        let clone = broker.clone();

        clone.on_every_message(|_, _| {});

        assert_eq!(broker.uuid(), clone.uuid());
        assert_eq!(broker.dispatcher().subscription_count(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let first = broker_over(&RecordingTransport::new(ConnectionState::Open));
        let second = broker_over(&RecordingTransport::new(ConnectionState::Open));

        first.on_every_message(|_, _| {});
        first.receive("[broker_id][Client-1]");

        assert_eq!(second.dispatcher().subscription_count(), 0);
        assert_eq!(second.connection_id(), None);
        assert_ne!(first.uuid(), second.uuid());
    }
}
