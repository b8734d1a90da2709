//! Verb factories taking an options record, for callers that prefer one call over a chain.
//!
//! ```no_run
//! use http_agent::{Agent, RequestOptions};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), http_agent::AgentError> {
//! let prepared = Agent::post_with(
//!     "https://example.com/items",
//!     RequestOptions::new()
//!         .header("Accept", "application/json")
//!         .body(json!({ "name": "widget" }))
//!         .on_complete(|outcome| println!("{:?}", outcome.map(|r| r.status()))),
//! )?;
//! assert!(prepared.is_started());
//! # Ok(()) }
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::agent::Agent;
use crate::errors::AgentError;
use crate::net::{Headers, Response, Transport};
use crate::transfer::Transfer;

pub type ResponseCallback = Box<dyn FnOnce(Result<Response, AgentError>) + Send + 'static>;

/// Optional headers, JSON body, completion callback and transport for the `*_with` factories.
#[derive(Default)]
pub struct RequestOptions {
    pub headers: Option<Headers>,
    pub body: Option<Value>,
    pub on_complete: Option<ResponseCallback>,
    pub transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("on_complete", &self.on_complete.as_ref().map(|_| "FnOnce(..)"))
            .field("transport", &self.transport)
            .finish()
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(Headers::new).set(name, value);
        self
    }

    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn on_complete<F>(mut self, done: F) -> Self
    where
        F: FnOnce(Result<Response, AgentError>) + Send + 'static,
    {
        self.on_complete = Some(Box::new(done));
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

/// What an options factory produced: a configured agent still waiting for `end`, or a transfer
/// that is already running because a completion callback was supplied.
#[derive(Debug)]
pub enum Prepared {
    Pending(Agent),
    Started(Transfer),
}

impl Prepared {
    pub fn is_started(&self) -> bool {
        matches!(self, Prepared::Started(_))
    }

    pub fn into_agent(self) -> Option<Agent> {
        match self {
            Prepared::Pending(agent) => Some(agent),
            Prepared::Started(_) => None,
        }
    }

    pub fn into_transfer(self) -> Option<Transfer> {
        match self {
            Prepared::Started(transfer) => Some(transfer),
            Prepared::Pending(_) => None,
        }
    }
}

impl Agent {
    /// Builds an agent from `options`. A body is only accepted for POST and PUT.
    pub fn with_options(
        method: Method,
        url: impl Into<String>,
        options: RequestOptions,
    ) -> Result<Prepared, AgentError> {
        let RequestOptions {
            headers,
            body,
            on_complete,
            transport,
        } = options;

        if body.is_some() && !(method == Method::POST || method == Method::PUT) {
            return Err(AgentError::BodyNotAllowed(method));
        }

        let mut agent = Agent::new(method, url);
        if let Some(headers) = headers {
            agent = agent.with_headers(headers);
        }
        if let Some(transport) = transport {
            agent = agent.with_transport(transport);
        }
        if let Some(body) = body {
            agent = agent.send(&body)?;
        }

        Ok(match on_complete {
            Some(done) => Prepared::Started(agent.end(done)),
            None => Prepared::Pending(agent),
        })
    }

    pub fn get_with(url: impl Into<String>, options: RequestOptions) -> Result<Prepared, AgentError> {
        Self::with_options(Method::GET, url, options)
    }

    pub fn post_with(url: impl Into<String>, options: RequestOptions) -> Result<Prepared, AgentError> {
        Self::with_options(Method::POST, url, options)
    }

    pub fn put_with(url: impl Into<String>, options: RequestOptions) -> Result<Prepared, AgentError> {
        Self::with_options(Method::PUT, url, options)
    }

    pub fn delete_with(url: impl Into<String>, options: RequestOptions) -> Result<Prepared, AgentError> {
        Self::with_options(Method::DELETE, url, options)
    }
}
