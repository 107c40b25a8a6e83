//! # bank-client
//!
//! Client runtime for the Bank-Over-UDP banking service.
//!
//! # Architecture overview (for beginners)
//!
//! The crate follows the same layering as its binary's call path:
//!
//! - **`application`** – [`BankService`](application::banking::BankService):
//!   one method per banking operation.  It builds request bodies, hands them
//!   to the transport and turns server rejections into typed errors.
//!
//! - **`infrastructure::network`** – the invocation-semantics
//!   [`Transport`](infrastructure::network::Transport).  It turns one
//!   unreliable UDP exchange into maybe, at-least-once or at-most-once
//!   delivery, and runs the monitoring listener.
//!
//! - **`infrastructure::storage`** – the TOML configuration file.
//!
//! **Dependency rule**: `application` talks to the network only through the
//! [`Connection`](infrastructure::network::Connection) trait, so every
//! operation can be tested against a mock socket.

pub mod application;
pub mod infrastructure;
