//! Request and response envelopes.
//!
//! Each datagram carries exactly one envelope.  The envelope's `Data` field is
//! an [`Opaque`] slot: the request body is encoded into it when the request is
//! built, and the response body stays raw until the caller decodes it into
//! the type it expects for that method.
//!
//! ```text
//! Request  { RSN: int, Method: text, Data: opaque, SentAt: timestamp }
//! Response { ErrMsg: text, Data: opaque }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{CodecError, Decode, Encode, Opaque};
use crate::protocol::method::Method;
use crate::protocol::sequence::REQUEST_SEQUENCE;
use crate::record;

// ── Request ───────────────────────────────────────────────────────────────────

/// One call to a remote operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request sequence number.  Signed on the wire to match the server's
    /// integer type.
    pub rsn: i64,
    pub method: Method,
    pub data: Opaque,
    pub sent_at: SystemTime,
}

record!(Request {
    rsn => "RSN",
    method => "Method",
    data => "Data",
    sent_at => "SentAt",
});

impl Request {
    /// Builds a request for `method` carrying `payload`, stamped with the next
    /// process-wide sequence number and the current time.
    ///
    /// The payload is encoded before a number is taken, so a payload that
    /// cannot be encoded does not consume one.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] raised while encoding `payload`.
    pub fn new<T: Encode + ?Sized>(method: Method, payload: &T) -> Result<Self, CodecError> {
        let data = Opaque::wrap(payload)?;
        // Wraps past i64::MAX; a process will not live that long.
        let rsn = REQUEST_SEQUENCE.next() as i64;
        Ok(Self {
            rsn,
            method,
            data,
            sent_at: SystemTime::now(),
        })
    }

    /// Decodes the request body into `dest`.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] raised by the second-phase decode.
    pub fn payload_into<T: Decode + ?Sized>(&self, dest: &mut T) -> Result<(), CodecError> {
        self.data.decode_into(dest)
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            rsn: 0,
            method: Method::Open,
            data: Opaque::default(),
            sent_at: UNIX_EPOCH,
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// The server's answer to a [`Request`].
///
/// An empty `err_msg` means success; anything else is a business-level
/// failure reported by the server (wrong password, insufficient funds…),
/// which is distinct from a delivery failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub err_msg: String,
    pub data: Opaque,
}

record!(Response {
    err_msg => "ErrMsg",
    data => "Data",
});

impl Response {
    /// A successful response carrying `payload`.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] raised while encoding `payload`.
    pub fn success<T: Encode + ?Sized>(payload: &T) -> Result<Self, CodecError> {
        Ok(Self {
            err_msg: String::new(),
            data: Opaque::wrap(payload)?,
        })
    }

    /// A failed response with no body.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            err_msg: message.into(),
            data: Opaque::default(),
        }
    }

    pub fn has_error(&self) -> bool {
        !self.err_msg.is_empty()
    }

    /// Decodes the response body into `dest`.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] raised by the second-phase decode.
    pub fn payload_into<T: Decode + ?Sized>(&self, dest: &mut T) -> Result<(), CodecError> {
        self.data.decode_into(dest)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, decode_value, encode, Value};

    #[test]
    fn test_request_round_trip_keeps_every_field() {
        // Arrange
        let request = Request::new(Method::Balance, "payload").unwrap();

        // Act
        let bytes = encode(&request).unwrap();
        let mut back = Request::default();
        decode(&bytes, &mut back).unwrap();

        // Assert: timestamps travel with millisecond precision.
        assert_eq!(back.rsn, request.rsn);
        assert_eq!(back.method, Method::Balance);
        assert_eq!(back.data, request.data);
        let drift = request
            .sent_at
            .duration_since(back.sent_at)
            .unwrap_or_default();
        assert!(drift.as_millis() < 1);
    }

    #[test]
    fn test_request_wire_field_names() {
        let request = Request::new(Method::Open, &0u8).unwrap();
        let tree = decode_value(&encode(&request).unwrap()).unwrap();
        for name in ["RSN", "Method", "Data", "SentAt"] {
            assert!(tree.field(name).is_some(), "missing field {name}");
        }
        assert!(matches!(tree.field("RSN"), Some(Value::Int(i)) if i.is_signed()));
    }

    #[test]
    fn test_consecutive_requests_get_increasing_numbers() {
        let first = Request::new(Method::CheckState, "").unwrap();
        let second = Request::new(Method::CheckState, "").unwrap();
        assert!(second.rsn > first.rsn);
    }

    #[test]
    fn test_unencodable_payload_is_rejected() {
        let absent: Option<u8> = None;
        assert_eq!(
            Request::new(Method::Open, &absent),
            Err(CodecError::AbsentReference)
        );
    }

    #[test]
    fn test_request_body_decodes_into_concrete_type() {
        let request = Request::new(Method::Monitor, &30i64).unwrap();
        let mut interval = 0i64;
        request.payload_into(&mut interval).unwrap();
        assert_eq!(interval, 30);
    }

    #[test]
    fn test_response_success_and_failure() {
        let ok = Response::success("fine").unwrap();
        assert!(!ok.has_error());
        let mut text = String::new();
        ok.payload_into(&mut text).unwrap();
        assert_eq!(text, "fine");

        let failed = Response::failure("wrong password");
        assert!(failed.has_error());
        assert!(failed.data.is_empty());
    }

    #[test]
    fn test_response_round_trip() {
        let response = Response::failure("insufficient balance");
        let bytes = encode(&response).unwrap();
        let mut back = Response::default();
        decode(&bytes, &mut back).unwrap();
        assert_eq!(back, response);
    }
}
