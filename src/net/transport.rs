//! The seam between an agent and the network.
//!
//! A [`Transport`] receives a validated [`OutgoingRequest`] and reports progress as a sequence of
//! [`TransferEvent`]s on a channel. The sequence must follow the lifecycle order:
//!
//! ```text
//! Response(meta)  Data(chunk)*  Finished
//! ```
//!
//! or end early with a single `Failed(..)` at any point. Once the receiving side is dropped the
//! transport should stop sending and release whatever it holds.

pub mod client;
pub mod mock;

use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::config::DEFAULT_EVENT_CAPACITY;
use crate::errors::TransferError;
use crate::net::{OutgoingRequest, ResponseMeta};

#[derive(Debug)]
pub enum TransferEvent {
    /// Status line and headers have arrived
    Response(ResponseMeta),
    /// Next chunk of body bytes, in order
    Data(Vec<u8>),
    /// End of transfer
    Finished,
    /// Transfer-level failure (DNS, connect, TLS, timeout, broken stream)
    Failed(TransferError),
}

impl TransferEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TransferEvent::Response(_) => "response",
            TransferEvent::Data(_) => "data",
            TransferEvent::Finished => "finished",
            TransferEvent::Failed(_) => "failure",
        }
    }
}

pub trait Transport: Debug + Send + Sync {
    /// Starts the transfer and returns immediately. Called from within a Tokio runtime.
    fn start(&self, request: OutgoingRequest, events: mpsc::Sender<TransferEvent>);

    /// Capacity of the event channel created for each transfer.
    fn event_capacity(&self) -> usize {
        DEFAULT_EVENT_CAPACITY
    }
}
