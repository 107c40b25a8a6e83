//! Names of the remote operations a request can invoke.

use std::fmt;
use std::str::FromStr;

use crate::codec::{CodecError, Decode, Encode, Value};

/// A remote operation.  Travels as its lowercase text name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Open,
    Close,
    Balance,
    UpdateBalance,
    Monitor,
    CheckState,
    Transfer,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Method; 7] = [
        Method::Open,
        Method::Close,
        Method::Balance,
        Method::UpdateBalance,
        Method::Monitor,
        Method::CheckState,
        Method::Transfer,
    ];

    /// The name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Open => "open",
            Method::Close => "close",
            Method::Balance => "balance",
            Method::UpdateBalance => "update_balance",
            Method::Monitor => "monitor",
            Method::CheckState => "check_state",
            Method::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known method names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid api method: {0:?}")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidMethod(s.to_owned()))
    }
}

impl Encode for Method {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::Text(self.as_str().to_owned()))
    }
}

impl Decode for Method {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let mut name = String::new();
        name.decode_from(value)?;
        *self = name
            .parse()
            .map_err(|e: InvalidMethod| CodecError::MalformedPayload(e.to_string()))?;
        Ok(())
    }
}
