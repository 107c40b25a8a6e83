//! The invocation-semantics transport.
//!
//! [`Transport::fetch`] performs one request/reply exchange under the
//! configured [`InvocationSemantic`]:
//!
//! ```text
//! Idle → Encoding → Sending → AwaitingReply ─┬─ reply    → Decoded
//!                      ▲                     ├─ timeout  → Sending (retransmitting semantics)
//!                      └─────────────────────┘            or Timeout error (maybe)
//!                                            └─ limit hit → DeliveryFailed
//! ```
//!
//! The request is encoded once.  Every retransmission sends the identical
//! bytes, so the server sees the same sequence number each time and can
//! recognise the duplicate.  A reply that arrives but does not decode counts
//! as a failed attempt: the request is sent again rather than the same bytes
//! being parsed a second time.
//!
//! [`Transport::listen`] is the monitoring mode: one request out, then a
//! stream of server pushes until the server says stop or the deadline passes.

use std::time::{Duration, Instant};

use bank_core::codec::{self, Decode, Encode};
use bank_core::protocol::{CallbackFunction, CallbackMessage};
use tracing::{debug, info, warn};

use super::{is_timeout_error, Connection, InvocationSemantic, TransportError};

/// Per-attempt read timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest reply accepted by default.  Longer datagrams are truncated by the
/// socket and then fail to decode.
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 1024;

/// How a monitoring session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The server sent a stop-monitoring callback.
    Stopped,
    /// The deadline passed first.
    Expired,
}

/// Sends requests and collects replies under one invocation semantic.
///
/// The transport holds no socket; each call borrows a [`Connection`], so a
/// single connection can serve many calls and tests can pass a mock.
#[derive(Debug, Clone)]
pub struct Transport {
    semantic: InvocationSemantic,
    timeout: Duration,
    /// `None` retries forever.
    max_attempts: Option<u32>,
    receive_buffer_size: usize,
}

impl Transport {
    /// A transport with unbounded retries and the default buffer size.
    pub fn new(semantic: InvocationSemantic, timeout: Duration) -> Self {
        Self {
            semantic,
            timeout,
            max_attempts: None,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
        }
    }

    /// Caps the number of send attempts for retransmitting semantics.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size;
        self
    }

    pub fn semantic(&self) -> InvocationSemantic {
        self.semantic
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Sends `request` and decodes the reply into `dest`.
    ///
    /// `dest` is only written when the whole call succeeds; on any error it
    /// keeps its previous value.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Codec`] if the request cannot be encoded, or if the
    ///   single reply under [`InvocationSemantic::Maybe`] cannot be decoded.
    ///   Retransmitting semantics count an undecodable reply as a failed
    ///   attempt and send the request again.
    /// - [`TransportError::Timeout`] / [`TransportError::Io`] under
    ///   [`InvocationSemantic::Maybe`].
    /// - [`TransportError::DeliveryFailed`] when the attempt limit is reached.
    pub fn fetch<C, Q, R>(&self, conn: &C, request: &Q, dest: &mut R) -> Result<(), TransportError>
    where
        C: Connection + ?Sized,
        Q: Encode + ?Sized,
        R: Decode + Default,
    {
        let encoded = codec::encode(request)?;

        let outcome = if self.semantic.retransmits() {
            self.exchange_with_retry(conn, &encoded)
        } else {
            debug!(len = encoded.len(), "sending request once");
            self.exchange(conn, &encoded)
                .and_then(|reply| decode_reply(&reply))
        };
        reset_read_timeout(conn);
        *dest = outcome?;
        Ok(())
    }

    /// Sends `request` once, then passes every update pushed by the server
    /// to `on_update` until the server stops the session or `deadline`
    /// passes.
    ///
    /// Blocks the calling thread for the whole session.  Callbacks with an
    /// unknown function id are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] for socket failures other than the read
    /// timeout, [`TransportError::Codec`] for a push that cannot be decoded
    /// into a callback message or into `T`.
    pub fn listen<C, Q, T, F>(
        &self,
        conn: &C,
        request: &Q,
        deadline: Instant,
        mut on_update: F,
    ) -> Result<MonitorOutcome, TransportError>
    where
        C: Connection + ?Sized,
        Q: Encode + ?Sized,
        T: Decode + Default,
        F: FnMut(T),
    {
        let encoded = codec::encode(request)?;
        conn.send(&encoded)?;
        info!("monitoring started");

        let outcome = self.receive_callbacks(conn, deadline, &mut on_update);
        reset_read_timeout(conn);
        outcome
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// One send followed by one bounded read.
    fn exchange<C: Connection + ?Sized>(
        &self,
        conn: &C,
        encoded: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        conn.set_read_timeout(Some(self.timeout))?;
        conn.send(encoded)?;

        let mut buf = vec![0u8; self.receive_buffer_size];
        match conn.recv(&mut buf) {
            Ok(len) => {
                buf.truncate(len);
                Ok(buf)
            }
            Err(e) if is_timeout_error(&e) => Err(TransportError::Timeout(self.timeout)),
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    /// Repeats send, read and decode until one attempt yields a reply that
    /// decodes into `R`.
    fn exchange_with_retry<C, R>(&self, conn: &C, encoded: &[u8]) -> Result<R, TransportError>
    where
        C: Connection + ?Sized,
        R: Decode + Default,
    {
        let mut attempts: u32 = 0;
        loop {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                warn!(attempts, "giving up: no reply");
                return Err(TransportError::DeliveryFailed { attempts });
            }
            attempts = attempts.saturating_add(1);
            debug!(attempt = attempts, semantic = %self.semantic, "sending request");

            match self
                .exchange(conn, encoded)
                .and_then(|reply| decode_reply(&reply))
            {
                Ok(decoded) => return Ok(decoded),
                Err(e) => warn!(attempt = attempts, error = %e, "no usable reply, retransmitting"),
            }
        }
    }

    fn receive_callbacks<C, T, F>(
        &self,
        conn: &C,
        deadline: Instant,
        on_update: &mut F,
    ) -> Result<MonitorOutcome, TransportError>
    where
        C: Connection + ?Sized,
        T: Decode + Default,
        F: FnMut(T),
    {
        let mut buf = vec![0u8; self.receive_buffer_size];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                info!("monitoring interval elapsed");
                return Ok(MonitorOutcome::Expired);
            }
            conn.set_read_timeout(Some(remaining))?;

            let len = match conn.recv(&mut buf) {
                Ok(len) => len,
                // The OS may wake slightly early; the top of the loop decides.
                Err(e) if is_timeout_error(&e) => continue,
                Err(e) => return Err(e.into()),
            };

            let mut message = CallbackMessage::default();
            codec::decode(&buf[..len], &mut message)?;
            match message.function {
                CallbackFunction::Update => {
                    let mut update = T::default();
                    message.data.decode_into(&mut update)?;
                    on_update(update);
                }
                CallbackFunction::StopMonitoring => {
                    info!("server ended monitoring");
                    return Ok(MonitorOutcome::Stopped);
                }
                CallbackFunction::Unknown(id) => {
                    warn!(function_id = id, "ignoring callback with unknown function id");
                }
            }
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(InvocationSemantic::default(), DEFAULT_TIMEOUT)
    }
}

/// Decodes one reply into a fresh `R`, so a failure never leaves a
/// half-written destination behind.
fn decode_reply<R: Decode + Default>(bytes: &[u8]) -> Result<R, TransportError> {
    let mut fresh = R::default();
    codec::decode(bytes, &mut fresh)?;
    Ok(fresh)
}

/// Puts the socket back into blocking-forever mode.  Failure only affects the
/// next call, which sets its own timeout anyway, so it is logged, not raised.
fn reset_read_timeout<C: Connection + ?Sized>(conn: &C) {
    if let Err(e) = conn.set_read_timeout(None) {
        warn!(error = %e, "could not reset read timeout");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
