//! Application layer: banking use cases built on the network transport.

pub mod banking;

pub use banking::{BankError, BankService, Credentials};
