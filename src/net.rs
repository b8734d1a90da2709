//! Wire-level types: the header map an agent builds, the validated request handed to a
//! transport, the response model, and the transports themselves.

pub mod headers;
pub mod request;
pub mod response;
pub mod transport;

pub use headers::Headers;
pub use request::OutgoingRequest;
pub use response::{Response, ResponseMeta};
pub use transport::client::HttpTransport;
pub use transport::mock::{MockStep, MockTransport};
pub use transport::{TransferEvent, Transport};
