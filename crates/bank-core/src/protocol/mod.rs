//! Envelopes exchanged with the banking server and the request sequence counter.

pub mod callback;
pub mod envelope;
pub mod method;
pub mod sequence;

pub use callback::{CallbackFunction, CallbackMessage};
pub use envelope::{Request, Response};
pub use method::{InvalidMethod, Method};
pub use sequence::{SequenceCounter, REQUEST_SEQUENCE};
