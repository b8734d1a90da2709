//! In-memory transport.
//!
//! Never touches the network. Every request it receives is recorded, and the reply is produced
//! from a fixed reply: echo the request body back, answer with a canned body, fail, or
//! replay an arbitrary script of [`MockStep`]s (which may deliberately break the lifecycle order).

use std::sync::{Arc, Mutex, PoisonError};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::mpsc;

use crate::errors::TransferError;
use crate::net::transport::{TransferEvent, Transport};
use crate::net::{OutgoingRequest, ResponseMeta};

const DEFAULT_CHUNK_SIZE: usize = 8;

/// One scripted transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStep {
    Response { status: u16, headers: Vec<(String, String)> },
    Data(Vec<u8>),
    Finish,
    Fail(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    /// 200 with the request body (and its content type) sent back
    Echo,
    /// Fixed status and body
    Respond { status: u16, body: Vec<u8> },
    /// Connection-level failure before any response
    Fail(String),
    /// Exact event sequence
    Script(Vec<MockStep>),
}

#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: MockReply,
    chunk_size: usize,
    requests: Arc<Mutex<Vec<OutgoingRequest>>>,
}

impl MockTransport {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            chunk_size: DEFAULT_CHUNK_SIZE,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::with_reply(MockReply::Echo)
    }

    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(MockReply::Respond { status, body: body.into() })
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Fail(reason.into()))
    }

    pub fn scripted(steps: Vec<MockStep>) -> Self {
        Self::with_reply(MockReply::Script(steps))
    }

    /// Size of the body chunks produced by `echo` and `respond`. Clamped to at least 1.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Every request started so far, in order.
    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn steps_for(&self, request: &OutgoingRequest) -> Vec<MockStep> {
        match &self.reply {
            MockReply::Echo => {
                let mut headers = Vec::new();
                if let Some(ct) = request.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
                    headers.push((CONTENT_TYPE.to_string(), ct.to_string()));
                }
                let body = request.body.clone().unwrap_or_default();
                self.respond_steps(200, headers, &body)
            }
            MockReply::Respond { status, body } => self.respond_steps(*status, Vec::new(), body),
            MockReply::Fail(reason) => vec![MockStep::Fail(reason.clone())],
            MockReply::Script(steps) => steps.clone(),
        }
    }

    fn respond_steps(&self, status: u16, headers: Vec<(String, String)>, body: &[u8]) -> Vec<MockStep> {
        let mut steps = vec![MockStep::Response { status, headers }];
        steps.extend(body.chunks(self.chunk_size).map(|c| MockStep::Data(c.to_vec())));
        steps.push(MockStep::Finish);
        steps
    }
}

impl Transport for MockTransport {
    fn start(&self, request: OutgoingRequest, events: mpsc::Sender<TransferEvent>) {
        let steps = self.steps_for(&request);
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        tokio::spawn(async move {
            for step in steps {
                let event = match step {
                    MockStep::Response { status, headers } => {
                        TransferEvent::Response(ResponseMeta::new(url.clone(), status, header_map(&headers)))
                    }
                    MockStep::Data(bytes) => TransferEvent::Data(bytes),
                    MockStep::Finish => TransferEvent::Finished,
                    MockStep::Fail(reason) => TransferEvent::Failed(TransferError::Connection(reason)),
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });
    }
}

fn header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        // scripted headers are test input, skip anything that is not valid on the wire
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            map.insert(name, value);
        }
    }
    map
}
