//! Fluent HTTP client for JSON APIs.
//!
//! Build a request with [`Agent`], optionally attach a JSON body with [`Agent::send`], then either
//! start it with [`Agent::end`] and get the outcome in a callback, or `await` it with
//! [`Agent::fetch`]. The outcome is a [`Response`] with the body already decoded as JSON, or an
//! [`AgentError`] telling a failed transfer apart from a body that was not JSON.

pub mod agent;
pub mod config;
pub mod errors;
pub mod net;
pub mod transfer;

pub use agent::{request, Agent, Prepared, RequestOptions, ResponseCallback};
pub use config::TransportConfig;
pub use errors::{AgentError, TransferError};
pub use net::{Headers, Response, ResponseMeta};
pub use transfer::{Transfer, TransferId, TransferState};
