//! Transfer lifecycle.
//!
//! A transfer moves through
//!
//! ```text
//! Idle -> Sending -> ReceivingHeaders -> ReceivingBody -> Complete
//!                \______________________________________-> Failed
//! ```
//!
//! driven by the [`TransferEvent`]s its transport emits. [`Lifecycle`] is the pure state
//! machine; [`drive`] wires it to a transport and produces the single terminal outcome.

use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use crate::errors::{AgentError, TransferError};
use crate::net::{OutgoingRequest, Response, ResponseMeta, TransferEvent, Transport};

/// A unique identifier for a transfer, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TransferId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    Sending,
    ReceivingHeaders,
    ReceivingBody,
    Complete,
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Complete | TransferState::Failed)
    }
}

impl Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferState::Idle => write!(f, "idle"),
            TransferState::Sending => write!(f, "sending"),
            TransferState::ReceivingHeaders => write!(f, "receiving headers"),
            TransferState::ReceivingBody => write!(f, "receiving body"),
            TransferState::Complete => write!(f, "complete"),
            TransferState::Failed => write!(f, "failed"),
        }
    }
}

/// Result of feeding one event into the lifecycle.
#[derive(Debug)]
pub enum Step {
    Continue,
    Done(Result<Response, AgentError>),
}

/// Per-transfer state: current phase, the response metadata once known and the body buffer.
#[derive(Debug)]
pub struct Lifecycle {
    id: TransferId,
    state: TransferState,
    meta: Option<ResponseMeta>,
    buffer: Vec<u8>,
}

impl Lifecycle {
    pub fn new(id: TransferId) -> Self {
        Self {
            id,
            state: TransferState::Idle,
            meta: None,
            buffer: Vec::new(),
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Idle -> Sending. Resets the body buffer.
    pub fn begin(&mut self) {
        self.state = TransferState::Sending;
        self.meta = None;
        self.buffer.clear();
    }

    pub fn advance(&mut self, event: TransferEvent) -> Step {
        use TransferState::*;

        match (self.state, event) {
            (Sending, TransferEvent::Response(meta)) => {
                log::debug!("transfer {}: {} {} from {}", self.id, meta.status, meta.status_text, meta.url);
                self.meta = Some(meta);
                self.state = ReceivingHeaders;
                Step::Continue
            }
            (ReceivingHeaders | ReceivingBody, TransferEvent::Data(chunk)) => {
                log::trace!("transfer {}: {} body bytes", self.id, chunk.len());
                self.buffer.extend_from_slice(&chunk);
                self.state = ReceivingBody;
                Step::Continue
            }
            (ReceivingHeaders | ReceivingBody, TransferEvent::Finished) => match self.meta.take() {
                Some(meta) => {
                    self.state = Complete;
                    let body = std::mem::take(&mut self.buffer);
                    log::debug!("transfer {}: complete, {} bytes", self.id, body.len());
                    Step::Done(Response::decode(meta, body))
                }
                None => self.fail(TransferError::Interrupted),
            },
            (Sending | ReceivingHeaders | ReceivingBody, TransferEvent::Failed(e)) => self.fail(e),
            (state, event) => self.fail(TransferError::OutOfOrder { event: event.kind(), state }),
        }
    }

    /// Moves to `Failed`, dropping any metadata and buffered bytes.
    pub fn fail(&mut self, error: TransferError) -> Step {
        log::warn!("transfer {}: failed while {}: {}", self.id, self.state, error);
        self.state = TransferState::Failed;
        self.meta = None;
        self.buffer.clear();
        Step::Done(Err(error.into()))
    }
}

/// Runs one transfer to its terminal event. The event receiver, and with it the transport's
/// only way to report progress, is dropped as soon as an outcome is known.
pub async fn drive(
    id: TransferId,
    transport: Arc<dyn Transport>,
    request: Result<OutgoingRequest, TransferError>,
) -> Result<Response, AgentError> {
    let mut lifecycle = Lifecycle::new(id);
    lifecycle.begin();

    let request = match request {
        Ok(request) => request,
        Err(e) => return finish(lifecycle.fail(e)),
    };

    log::debug!("transfer {}: {} {}", id, request.method, request.url);

    let (tx, mut rx) = mpsc::channel(transport.event_capacity().max(1));
    transport.start(request, tx);

    while let Some(event) = rx.recv().await {
        if let Step::Done(outcome) = lifecycle.advance(event) {
            return outcome;
        }
    }

    finish(lifecycle.fail(TransferError::Interrupted))
}

fn finish(step: Step) -> Result<Response, AgentError> {
    match step {
        Step::Done(outcome) => outcome,
        // fail() always terminates
        Step::Continue => Err(TransferError::Interrupted.into()),
    }
}

/// Handle to a transfer started with [`Agent::end`](crate::Agent::end).
///
/// There is no way to abort a transfer: dropping the handle detaches it and the callback still
/// runs once the transfer reaches its terminal event.
#[derive(Debug)]
pub struct Transfer {
    id: TransferId,
    /// `None` when the outcome was delivered without spawning (no runtime available)
    task: Option<JoinHandle<()>>,
}

impl Transfer {
    pub(crate) fn spawned(id: TransferId, task: JoinHandle<()>) -> Self {
        Self { id, task: Some(task) }
    }

    pub(crate) fn completed(id: TransferId) -> Self {
        Self { id, task: None }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    /// True once the callback has returned.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits until the callback has run. Fails only if the callback panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        match self.task {
            Some(task) => task.await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Headers, MockStep, MockTransport};
    use http::{HeaderMap, Method};
    use serde_json::json;

    fn meta(status: u16) -> ResponseMeta {
        ResponseMeta::new("http://mock.test/".parse().unwrap(), status, HeaderMap::new())
    }

    fn sending() -> Lifecycle {
        let mut lc = Lifecycle::new(TransferId::new());
        lc.begin();
        lc
    }

    fn done(step: Step) -> Result<Response, AgentError> {
        match step {
            Step::Done(outcome) => outcome,
            Step::Continue => panic!("expected a terminal step"),
        }
    }

    #[test]
    fn happy_path_walks_all_states() {
        let mut lc = Lifecycle::new(TransferId::new());
        assert_eq!(lc.state(), TransferState::Idle);

        lc.begin();
        assert_eq!(lc.state(), TransferState::Sending);

        assert!(matches!(lc.advance(TransferEvent::Response(meta(200))), Step::Continue));
        assert_eq!(lc.state(), TransferState::ReceivingHeaders);

        assert!(matches!(lc.advance(TransferEvent::Data(br#"{"a":"#.to_vec())), Step::Continue));
        assert!(matches!(lc.advance(TransferEvent::Data(b"1}".to_vec())), Step::Continue));
        assert_eq!(lc.state(), TransferState::ReceivingBody);
        assert_eq!(lc.buffered(), 7);

        let resp = done(lc.advance(TransferEvent::Finished)).unwrap();
        assert_eq!(lc.state(), TransferState::Complete);
        assert!(lc.state().is_terminal());
        assert_eq!(resp.body, json!({"a": 1}));
    }

    #[test]
    fn failure_after_headers_drops_metadata() {
        let mut lc = sending();
        lc.advance(TransferEvent::Response(meta(200)));
        lc.advance(TransferEvent::Data(b"{".to_vec()));

        let err = done(lc.advance(TransferEvent::Failed(TransferError::Connection("reset".into())))).unwrap_err();
        assert!(err.is_transfer());
        assert!(err.response_meta().is_none());
        assert_eq!(lc.state(), TransferState::Failed);
        assert_eq!(lc.buffered(), 0);
    }

    #[test]
    fn data_before_response_is_out_of_order() {
        let mut lc = sending();
        let err = done(lc.advance(TransferEvent::Data(b"x".to_vec()))).unwrap_err();
        assert!(matches!(
            err,
            AgentError::Transfer(TransferError::OutOfOrder { event: "data", state: TransferState::Sending })
        ));
    }

    #[test]
    fn events_after_terminal_state_are_out_of_order() {
        let mut lc = sending();
        lc.advance(TransferEvent::Response(meta(204)));
        done(lc.advance(TransferEvent::Finished)).unwrap();

        let err = done(lc.advance(TransferEvent::Finished)).unwrap_err();
        assert!(matches!(
            err,
            AgentError::Transfer(TransferError::OutOfOrder { state: TransferState::Complete, .. })
        ));
    }

    #[test]
    fn finish_without_response_is_out_of_order() {
        let mut lc = sending();
        let err = done(lc.advance(TransferEvent::Finished)).unwrap_err();
        assert!(matches!(err, AgentError::Transfer(TransferError::OutOfOrder { .. })));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let mut lc = sending();
        lc.advance(TransferEvent::Response(meta(200)));
        lc.advance(TransferEvent::Data(b"not-json".to_vec()));
        let err = done(lc.advance(TransferEvent::Finished)).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.response_meta().unwrap().status, 200);
    }

    fn get(url: &str) -> Result<OutgoingRequest, TransferError> {
        OutgoingRequest::prepare(Method::GET, url, &Headers::new(), None)
    }

    #[tokio::test]
    async fn drive_reports_invalid_request_without_starting_transport() {
        let transport = MockTransport::echo();
        let err = drive(TransferId::new(), Arc::new(transport.clone()), get("no scheme"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Transfer(TransferError::InvalidUrl { .. })));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn drive_treats_silent_transport_as_interrupted() {
        let transport = MockTransport::scripted(vec![MockStep::Response { status: 200, headers: vec![] }]);
        let err = drive(TransferId::new(), Arc::new(transport), get("http://mock.test/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Transfer(TransferError::Interrupted)));
    }

    #[tokio::test]
    async fn drive_stops_at_first_terminal_event() {
        let transport = MockTransport::scripted(vec![
            MockStep::Response { status: 200, headers: vec![] },
            MockStep::Data(b"[1,2]".to_vec()),
            MockStep::Finish,
            MockStep::Fail("late".into()),
        ]);
        let resp = drive(TransferId::new(), Arc::new(transport), get("http://mock.test/"))
            .await
            .unwrap();

        assert_eq!(resp.body, json!([1, 2]));
    }

    #[test]
    fn transfer_ids_are_unique() {
        assert_ne!(TransferId::new(), TransferId::new());
        let uuid = Uuid::new_v4();
        assert_eq!(TransferId::from(uuid).to_string(), uuid.to_string());
    }
}
