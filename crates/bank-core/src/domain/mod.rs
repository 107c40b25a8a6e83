//! Banking data carried inside request and response bodies.
//!
//! # What lives here? (for beginners)
//!
//! These are plain records with no networking in them.  They only know how to
//! turn themselves into codec values (through `record!`) and, for
//! [`Currency`], how to validate their input.  The client crate builds them
//! from user input and hands them to the transport.

pub mod account;
pub mod currency;
pub mod requests;

pub use account::Account;
pub use currency::{Currency, InvalidCurrency};
pub use requests::{
    BalanceRequest, CloseAccountRequest, MonitorRequest, OpenAccountRequest, TransferRequest,
    UpdateBalanceRequest,
};
