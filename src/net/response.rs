//! HTTP response model.
//!
//! [`ResponseMeta`] is what the transport reports before any body bytes arrive: the final URL
//! (after redirects, if the transport follows them), status code + reason and the response
//! headers. [`Response`] pairs that metadata with the body, already decoded as JSON.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for header names.
//! - `status_text` is derived from the status code's canonical reason phrase and is
//!   `"Unknown"` for non-standard codes.
//! - A non-2xx status is not an error. The body is decoded all the same; check
//!   [`ResponseMeta::is_success`] when it matters.
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AgentError;

#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,
}

impl ResponseMeta {
    pub fn new(url: url::Url, status: u16, headers: HeaderMap) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            url,
            status,
            status_text,
            headers,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A completed response with its body decoded as JSON.
#[derive(Debug, Clone)]
pub struct Response {
    pub meta: ResponseMeta,
    pub body: Value,
}

impl Response {
    /// Decodes the accumulated body. The body must be valid JSON text, except that an empty
    /// `204 No Content` body becomes `Value::Null`.
    pub fn decode(meta: ResponseMeta, body: Vec<u8>) -> Result<Self, AgentError> {
        if meta.status == StatusCode::NO_CONTENT.as_u16() && body.is_empty() {
            return Ok(Self { meta, body: Value::Null });
        }

        match serde_json::from_slice(&body) {
            Ok(value) => Ok(Self { meta, body: value }),
            Err(source) => Err(AgentError::Decode { meta, body, source }),
        }
    }

    pub fn status(&self) -> u16 {
        self.meta.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.meta.headers
    }

    /// Converts the decoded body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde::Deserialize::deserialize(&self.body)
    }

    pub fn into_parts(self) -> (ResponseMeta, Value) {
        (self.meta, self.body)
    }
}
