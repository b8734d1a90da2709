//! The request agent: a fluent builder that ends in exactly one transfer.
//!
//! ```no_run
//! use http_agent::Agent;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transfer = Agent::post("https://example.com/items")
//!     .set("Accept", "application/json")
//!     .send(&json!({ "name": "widget" }))?
//!     .end(|outcome| match outcome {
//!         Ok(resp) => println!("{} {}", resp.status(), resp.body),
//!         Err(e) => eprintln!("request failed: {e}"),
//!     });
//! transfer.join().await?;
//! # Ok(()) }
//! ```

pub mod options;

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::Method;
use serde::Serialize;

use crate::errors::{AgentError, TransferError};
use crate::net::{Headers, HttpTransport, OutgoingRequest, Response, Transport};
use crate::transfer::{self, Transfer, TransferId};

pub use options::{Prepared, RequestOptions, ResponseCallback};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Builder for a single JSON request; consumed by [`Agent::end`] or [`Agent::fetch`].
#[derive(Debug)]
pub struct Agent {
    method: Method,
    url: String,
    headers: Headers,
    body: Option<Vec<u8>>,
    /// Resolved to a fresh [`HttpTransport`] at dispatch when unset
    transport: Option<Arc<dyn Transport>>,
}

/// Shorthand for [`Agent::new`].
pub fn request(method: Method, url: impl Into<String>) -> Agent {
    Agent::new(method, url)
}

impl Agent {
    /// Creates an agent. The URL is not parsed until the request is dispatched.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            transport: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Sets a header, replacing any previous value under the same name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets every header in `headers`, in order.
    pub fn with_headers(mut self, headers: impl Into<Headers>) -> Self {
        let headers = headers.into();
        self.headers.extend(headers.iter());
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Serializes `body` as the request body and forces `Content-Type: application/json`.
    ///
    /// Fails right away if `body` cannot be represented as JSON (e.g. a map with non-string keys);
    /// nothing is sent in that case.
    pub fn send<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, AgentError> {
        let bytes = serde_json::to_vec(body).map_err(AgentError::Encode)?;
        self.headers.set(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE);
        self.body = Some(bytes);
        Ok(self)
    }

    /// Starts the transfer and hands its outcome to `done` exactly once.
    ///
    /// Returns immediately; the transfer runs on the current Tokio runtime. Outside a runtime
    /// nothing is sent and `done` is called right away with [`TransferError::NoRuntime`].
    pub fn end<F>(self, done: F) -> Transfer
    where
        F: FnOnce(Result<Response, AgentError>) + Send + 'static,
    {
        let id = TransferId::new();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("transfer {}: {} {} not started, no runtime", id, self.method, self.url);
                done(Err(TransferError::NoRuntime.into()));
                return Transfer::completed(id);
            }
        };

        let (transport, request) = self.into_dispatch();
        let task = runtime.spawn(async move {
            let outcome = transfer::drive(id, transport, request).await;
            done(outcome);
        });

        Transfer::spawned(id, task)
    }

    /// Runs the transfer and returns its outcome instead of calling back.
    pub async fn fetch(self) -> Result<Response, AgentError> {
        let (transport, request) = self.into_dispatch();
        transfer::drive(TransferId::new(), transport, request).await
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    fn into_dispatch(self) -> (Arc<dyn Transport>, Result<OutgoingRequest, TransferError>) {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::default()));
        let request = OutgoingRequest::prepare(self.method, &self.url, &self.headers, self.body);
        (transport, request)
    }
}
