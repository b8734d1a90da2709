use http::{HeaderMap, Method};
use url::Url;

use crate::errors::TransferError;
use crate::net::Headers;

/// A request that passed dispatch-time validation and can be handed to a transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl OutgoingRequest {
    /// Parses the URL and converts the headers. This is the first point at which a malformed
    /// URL or header is noticed.
    pub fn prepare(
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<Vec<u8>>,
    ) -> Result<Self, TransferError> {
        let url = Url::parse(url).map_err(|source| TransferError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        Ok(Self {
            method,
            url,
            headers: headers.to_header_map()?,
            body,
        })
    }
}
