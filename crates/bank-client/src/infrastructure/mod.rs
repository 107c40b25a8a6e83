//! Infrastructure layer for the client.
//!
//! Contains the OS-facing adapters: the UDP socket and transport, and the
//! configuration file.
//!
//! **Dependency rule**: this layer may depend on `bank_core`, but MUST NOT
//! import anything from `application`.

pub mod network;
pub mod storage;
