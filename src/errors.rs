use http::Method;

use crate::net::ResponseMeta;
use crate::transfer::TransferState;

/// Failures of the transfer itself. These always short-circuit JSON decoding.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("transport delivered {event} while {state}")]
    OutOfOrder {
        event: &'static str,
        state: TransferState,
    },

    #[error("transport closed before the transfer finished")]
    Interrupted,

    #[error("no Tokio runtime is running to drive the transfer")]
    NoRuntime,
}

/// Everything that can go wrong between building a request and handing a decoded body to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The transfer completed but the body was not JSON. The metadata and raw bytes are kept so
    /// callers can still inspect what the server sent.
    #[error("response body is not valid JSON: {source}")]
    Decode {
        meta: ResponseMeta,
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode request body as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{0} requests do not carry a JSON body")]
    BodyNotAllowed(Method),
}

impl AgentError {
    pub fn is_transfer(&self) -> bool {
        matches!(self, AgentError::Transfer(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, AgentError::Decode { .. })
    }

    /// Response metadata, only present when the server actually answered.
    pub fn response_meta(&self) -> Option<&ResponseMeta> {
        match self {
            AgentError::Decode { meta, .. } => Some(meta),
            _ => None,
        }
    }
}
