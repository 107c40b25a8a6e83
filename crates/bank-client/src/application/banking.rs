//! Use case: perform banking operations against the remote server.
//!
//! Each method builds the request body for one operation, wraps it in a
//! [`Request`] envelope (which stamps the sequence number), sends it through
//! the [`Transport`] and unpacks the reply:
//!
//! | Method          | Wire method      | Reply body      |
//! |-----------------|------------------|-----------------|
//! | `open`          | `open`           | [`Account`]     |
//! | `close`         | `close`          | any [`Value`]   |
//! | `balance`       | `balance`        | any [`Value`]   |
//! | `deposit`       | `update_balance` | [`Account`]     |
//! | `withdraw`      | `update_balance` | [`Account`]     |
//! | `transfer`      | `transfer`       | [`Account`]     |
//! | `check_state`   | `check_state`    | `Vec<Account>`  |
//! | `monitor`       | `monitor`        | pushed updates  |
//!
//! A reply with a non-empty `ErrMsg` becomes [`BankError::Rejected`], kept
//! apart from delivery failures so callers can tell "the bank said no" from
//! "the bank never answered".

use std::time::{Duration, Instant};

use bank_core::codec::{CodecError, Decode, Encode, Value};
use bank_core::domain::{
    Account, BalanceRequest, CloseAccountRequest, Currency, MonitorRequest, OpenAccountRequest,
    TransferRequest, UpdateBalanceRequest,
};
use bank_core::protocol::{Method, Request, Response};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::network::{Connection, MonitorOutcome, Transport, TransportError};

/// Errors surfaced by [`BankService`].
#[derive(Debug, Error)]
pub enum BankError {
    /// The request never got a usable reply.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be encoded or the reply body did not have
    /// the expected shape.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The server processed the request and refused it.
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// An amount was negative, zero where it must be positive, or not finite.
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
}

/// Identifies an existing account and proves ownership of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub account_number: i64,
    pub name: String,
    pub password: String,
}

/// Banking operations over one connection.
pub struct BankService<C: Connection> {
    conn: C,
    transport: Transport,
}

impl<C: Connection> BankService<C> {
    pub fn new(conn: C, transport: Transport) -> Self {
        Self { conn, transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Opens a new account.  The server assigns the account number.
    ///
    /// # Errors
    ///
    /// [`BankError::InvalidAmount`] for a negative or non-finite opening
    /// balance; otherwise see [`BankError`].
    pub fn open(
        &self,
        name: &str,
        password: &str,
        currency: Currency,
        initial_balance: f64,
    ) -> Result<Account, BankError> {
        if !initial_balance.is_finite() || initial_balance < 0.0 {
            return Err(BankError::InvalidAmount(initial_balance));
        }
        let body = OpenAccountRequest {
            account_number: 0,
            name: name.to_owned(),
            password: password.to_owned(),
            currency,
            initial_balance,
        };
        self.call(Method::Open, &body)
    }

    /// Closes an account.  The reply body is returned as sent.
    ///
    /// # Errors
    ///
    /// See [`BankError`].
    pub fn close(&self, credentials: &Credentials) -> Result<Value, BankError> {
        let body = CloseAccountRequest {
            account_number: credentials.account_number,
            name: credentials.name.clone(),
            password: credentials.password.clone(),
        };
        self.call(Method::Close, &body)
    }

    /// Queries the balance of an account in `currency`.
    ///
    /// # Errors
    ///
    /// See [`BankError`].
    pub fn balance(&self, credentials: &Credentials, currency: Currency) -> Result<Value, BankError> {
        let body = BalanceRequest {
            account_number: credentials.account_number,
            name: credentials.name.clone(),
            password: credentials.password.clone(),
            currency,
        };
        self.call(Method::Balance, &body)
    }

    /// Adds `amount` to the account.
    ///
    /// # Errors
    ///
    /// [`BankError::InvalidAmount`] unless `amount` is positive and finite;
    /// otherwise see [`BankError`].
    pub fn deposit(
        &self,
        credentials: &Credentials,
        currency: Currency,
        amount: f64,
    ) -> Result<Account, BankError> {
        self.update_balance(credentials, currency, positive(amount)?)
    }

    /// Takes `amount` out of the account.  Sent as a negated deposit.
    ///
    /// # Errors
    ///
    /// [`BankError::InvalidAmount`] unless `amount` is positive and finite;
    /// otherwise see [`BankError`].
    pub fn withdraw(
        &self,
        credentials: &Credentials,
        currency: Currency,
        amount: f64,
    ) -> Result<Account, BankError> {
        self.update_balance(credentials, currency, -positive(amount)?)
    }

    /// Moves `amount` to `dest_account_number`.
    ///
    /// # Errors
    ///
    /// [`BankError::InvalidAmount`] unless `amount` is positive and finite;
    /// otherwise see [`BankError`].
    pub fn transfer(
        &self,
        credentials: &Credentials,
        currency: Currency,
        amount: f64,
        dest_account_number: i64,
    ) -> Result<Account, BankError> {
        let body = TransferRequest {
            account_number: credentials.account_number,
            name: credentials.name.clone(),
            password: credentials.password.clone(),
            currency,
            amount: positive(amount)?,
            dest_account_number,
        };
        self.call(Method::Transfer, &body)
    }

    /// Lists every account the server holds.
    ///
    /// # Errors
    ///
    /// See [`BankError`].
    pub fn check_state(&self) -> Result<Vec<Account>, BankError> {
        self.call(Method::CheckState, &Value::default())
    }

    /// Registers for updates and blocks for `interval`, passing each pushed
    /// update to `on_update`.
    ///
    /// The monitoring request is sent once, without retransmission.
    ///
    /// # Errors
    ///
    /// See [`BankError`].
    pub fn monitor<T, F>(&self, interval: Duration, on_update: F) -> Result<MonitorOutcome, BankError>
    where
        T: Decode + Default,
        F: FnMut(T),
    {
        let body = MonitorRequest {
            interval: i64::try_from(interval.as_secs()).unwrap_or(i64::MAX),
        };
        let request = Request::new(Method::Monitor, &body)?;
        info!(rsn = request.rsn, secs = body.interval, "registering for updates");
        let deadline = monitor_deadline(Instant::now(), interval);
        Ok(self
            .transport
            .listen(&self.conn, &request, deadline, on_update)?)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn update_balance(
        &self,
        credentials: &Credentials,
        currency: Currency,
        amount: f64,
    ) -> Result<Account, BankError> {
        let body = UpdateBalanceRequest {
            account_number: credentials.account_number,
            name: credentials.name.clone(),
            password: credentials.password.clone(),
            currency,
            amount,
        };
        self.call(Method::UpdateBalance, &body)
    }

    /// Wraps `body` in a request envelope, fetches the reply and decodes its
    /// body into `R`.
    fn call<Q, R>(&self, method: Method, body: &Q) -> Result<R, BankError>
    where
        Q: Encode + ?Sized,
        R: Decode + Default,
    {
        let request = Request::new(method, body)?;
        debug!(rsn = request.rsn, %method, "calling server");

        let mut response = Response::default();
        self.transport.fetch(&self.conn, &request, &mut response)?;
        if response.has_error() {
            return Err(BankError::Rejected(response.err_msg));
        }

        let mut out = R::default();
        response.payload_into(&mut out)?;
        Ok(out)
    }
}

/// Longest local wait for a monitoring session.  Longer intervals are still
/// sent to the server unchanged.
const MAX_MONITOR_WAIT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// `now + interval`, clamped so that huge intervals cannot overflow `Instant`.
fn monitor_deadline(now: Instant, interval: Duration) -> Instant {
    now.checked_add(interval.min(MAX_MONITOR_WAIT))
        .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
        .unwrap_or(now)
}

fn positive(amount: f64) -> Result<f64, BankError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(BankError::InvalidAmount(amount))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
