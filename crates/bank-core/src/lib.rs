//! # bank-core
//!
//! Shared library for the Bank-Over-UDP client: the wire codec, the request
//! and response envelopes, and the banking records they carry.
//!
//! This crate opens no sockets.  Everything here is plain data and pure
//! functions, so it can be tested without a network.
//!
//! # Architecture overview (for beginners)
//!
//! The client talks to a banking server by sending one UDP datagram per
//! request and reading one datagram back.  There is no shared schema file;
//! instead every value in a datagram is prefixed with a one-byte tag that
//! says what kind of value follows.
//!
//! - **`codec`** – Turns Rust values into tagged bytes and back.  Records are
//!   matched field by field, by name.
//!
//! - **`protocol`** – The envelopes that frame each datagram (`Request`,
//!   `Response`, `CallbackMessage`) and the process-wide request sequence
//!   counter the server uses to spot retransmissions.
//!
//! - **`domain`** – Account and request records exchanged inside the
//!   envelopes, and currency validation.

pub mod codec;
pub mod domain;
pub mod protocol;

pub use codec::{
    decode, decode_opaque, decode_value, encode, CodecError, Decode, Encode, Opaque, Value,
};
pub use domain::{Account, Currency};
pub use protocol::{CallbackFunction, CallbackMessage, Method, Request, Response};
