//! Transport configuration.
//!
//! `TransportConfig` controls how the [`HttpTransport`](crate::net::HttpTransport) talks to the
//! network. Nothing in here changes the request an agent builds: no headers are injected unless
//! a user agent is configured explicitly.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use http_agent::config::TransportConfig;
//! let cfg = TransportConfig::default();
//! assert_eq!(cfg.event_capacity, 32);
//! assert!(cfg.user_agent.is_none());
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use http_agent::config::TransportConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = TransportConfig::builder()
//!     .user_agent("my-app/1.0")
//!     .event_capacity(8)
//!     .max_redirects(3)
//!     .build()?;
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `user_agent`: Optional `User-Agent` header set on every request.
//! - `event_capacity`: Bound of the channel carrying transport events to a transfer (default: 32).
//! - `max_redirects`: Redirect limit. `None` keeps the transport's default policy.

pub const DEFAULT_EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub user_agent: Option<String>,
    pub event_capacity: usize,
    pub max_redirects: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_redirects: None,
        }
    }
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    inner: TransportConfig,
}

impl TransportConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut TransportConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn event_capacity(self, n: usize) -> Self { self.map(|c| c.event_capacity = n) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = Some(n)) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<TransportConfig, TransportConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportConfigError {
    #[error("event_capacity must be at least 1")]
    ZeroCapacity,
    #[error("user_agent is not a valid header value")]
    InvalidUserAgent,
}

fn validate(c: &TransportConfig) -> Result<(), TransportConfigError> {
    if c.event_capacity == 0 {
        return Err(TransportConfigError::ZeroCapacity);
    }
    if let Some(ua) = &c.user_agent {
        if http::HeaderValue::from_str(ua).is_err() {
            return Err(TransportConfigError::InvalidUserAgent);
        }
    }
    Ok(())
}
