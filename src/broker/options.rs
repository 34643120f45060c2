//! Broker connection options.
//!
//! Provides the transport URL configuration for a [`Broker`](super::Broker)
//! session. The URL is either given explicitly or derived from the origin
//! of the page hosting the broker.
//!
//! # URL Resolution
//!
//! | `url` | `origin` | Result |
//! |-------|----------|--------|
//! | `ws://` or `wss://` URL | any | that URL |
//! | unparsable or other scheme | any | none |
//! | unset or empty | `https://host` | `wss://host/ws` |
//! | unset or empty | `http://host` | `ws://host/ws` |
//! | unset or empty | unset | none |
//!
//! # Example
//!
//! ```
//! use bracket_broker::{BrokerOptions, PageOrigin};
//!
//! let origin = PageOrigin::parse("https://example.com:8443").unwrap();
//! let options = BrokerOptions::new().with_origin(origin);
//!
//! let url = options.resolve_url().unwrap();
//! assert_eq!(url.as_str(), "wss://example.com:8443/ws");
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Fixed WebSocket endpoint path on the broker server.
pub const DEFAULT_PATH: &str = "/ws";

/// Transport scheme for plain origins.
const INSECURE_SCHEME: &str = "ws";

/// Transport scheme for secure origins.
const SECURE_SCHEME: &str = "wss";

// ============================================================================
// PageOrigin
// ============================================================================

/// Origin of the page hosting the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOrigin {
    /// Whether the page is served over HTTPS.
    pub secure: bool,
    /// Host with optional port, e.g. `example.com:8443`.
    pub host: String,
}

impl PageOrigin {
    /// Creates an origin from its parts.
    #[inline]
    #[must_use]
    pub fn new(secure: bool, host: impl Into<String>) -> Self {
        Self {
            secure,
            host: host.into(),
        }
    }

    /// Parses an origin such as `https://example.com:8443`.
    ///
    /// Only `https` counts as secure.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the origin is not a URL
    /// - [`Error::Config`] if it has no host
    pub fn parse(origin: &str) -> Result<Self> {
        let url = Url::parse(origin)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::config(format!("Origin has no host: {origin}")))?;

        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };

        Ok(Self {
            secure: url.scheme() == "https",
            host,
        })
    }

    /// Returns the transport scheme matching this origin.
    #[inline]
    #[must_use]
    pub fn transport_scheme(&self) -> &'static str {
        if self.secure {
            SECURE_SCHEME
        } else {
            INSECURE_SCHEME
        }
    }
}

// ============================================================================
// BrokerOptions
// ============================================================================

/// Transport configuration for a broker session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerOptions {
    /// Explicit transport URL. Empty counts as unset.
    pub url: Option<String>,

    /// Hosting page origin, used when no URL is given.
    pub origin: Option<PageOrigin>,

    /// Endpoint path appended to the origin.
    pub path: String,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BrokerOptions {
    /// Creates options with no URL, no origin, and the default path.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: None,
            origin: None,
            path: DEFAULT_PATH.to_owned(),
        }
    }

    /// Loads options from JSON.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BrokerOptions {
    /// Sets an explicit transport URL.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the hosting page origin.
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: PageOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the endpoint path used with the origin.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl BrokerOptions {
    /// Resolves the transport URL.
    ///
    /// Returns `None` when no usable URL can be produced; the reason is
    /// logged.
    #[must_use]
    pub fn resolve_url(&self) -> Option<Url> {
        match self.url.as_deref().filter(|url| !url.is_empty()) {
            Some(raw) => Self::parse_explicit(raw),
            None => self.derive_from_origin(),
        }
    }

    /// Accepts an explicit URL with a WebSocket scheme.
    fn parse_explicit(raw: &str) -> Option<Url> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = raw, error = %e, "Invalid transport URL");
                return None;
            }
        };

        match url.scheme() {
            INSECURE_SCHEME | SECURE_SCHEME => Some(url),
            scheme => {
                warn!(url = raw, scheme, "Transport URL is not a WebSocket URL");
                None
            }
        }
    }

    /// Builds `<scheme>://<host><path>` from the page origin.
    fn derive_from_origin(&self) -> Option<Url> {
        let Some(origin) = &self.origin else {
            warn!("No transport URL and no page origin");
            return None;
        };

        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        let raw = format!("{}://{}{}", origin.transport_scheme(), origin.host, path);
        match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(url = %raw, error = %e, "Derived transport URL is invalid");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
