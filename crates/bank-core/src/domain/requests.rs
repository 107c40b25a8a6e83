//! Bodies of the requests the client sends, one type per operation.
//!
//! Every type here travels inside the opaque `Data` slot of a
//! [`Request`](crate::protocol::Request).  Field names on the wire are the
//! server's PascalCase names.

use crate::domain::currency::Currency;
use crate::record;

/// Body of an `open` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenAccountRequest {
    /// Ignored by the server, which assigns the number.
    pub account_number: i64,
    pub name: String,
    pub password: String,
    pub currency: Currency,
    pub initial_balance: f64,
}

record!(OpenAccountRequest {
    account_number => "AccountNumber",
    name => "Name",
    password => "Password",
    currency => "Currency",
    initial_balance => "InitialBalance",
});

/// Body of a `close` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseAccountRequest {
    pub account_number: i64,
    pub name: String,
    pub password: String,
}

record!(CloseAccountRequest {
    account_number => "AccountNumber",
    name => "Name",
    password => "Password",
});

/// Body of a `balance` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceRequest {
    pub account_number: i64,
    pub name: String,
    pub password: String,
    pub currency: Currency,
}

record!(BalanceRequest {
    account_number => "AccountNumber",
    name => "Name",
    password => "Password",
    currency => "Currency",
});

/// Body of an `update_balance` request.
///
/// A deposit sends a positive `amount`; a withdrawal sends it negated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBalanceRequest {
    pub account_number: i64,
    pub name: String,
    pub password: String,
    pub currency: Currency,
    pub amount: f64,
}

record!(UpdateBalanceRequest {
    account_number => "AccountNumber",
    name => "Name",
    password => "Password",
    currency => "Currency",
    amount => "Amount",
});

/// Body of a `transfer` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferRequest {
    pub account_number: i64,
    pub name: String,
    pub password: String,
    pub currency: Currency,
    pub amount: f64,
    pub dest_account_number: i64,
}

record!(TransferRequest {
    account_number => "AccountNumber",
    name => "Name",
    password => "Password",
    currency => "Currency",
    amount => "Amount",
    dest_account_number => "DestAccountNumber",
});

/// Body of a `monitor` request: how long to receive updates, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorRequest {
    pub interval: i64,
}

record!(MonitorRequest { interval => "Interval" });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, decode_value, encode, Value};

    #[test]
    fn test_transfer_request_round_trip() {
        // Arrange
        let request = TransferRequest {
            account_number: 1,
            name: "Alice".into(),
            password: "pw".into(),
            currency: "EUR".parse().unwrap(),
            amount: 12.25,
            dest_account_number: 2,
        };

        // Act
        let bytes = encode(&request).unwrap();
        let mut back = TransferRequest::default();
        decode(&bytes, &mut back).unwrap();

        // Assert
        assert_eq!(back, request);
    }

    #[test]
    fn test_update_balance_amount_keeps_sign() {
        let request = UpdateBalanceRequest {
            amount: -40.0,
            ..Default::default()
        };
        let tree = decode_value(&encode(&request).unwrap()).unwrap();
        assert_eq!(tree.field("Amount"), Some(&Value::F64(-40.0)));
    }

    #[test]
    fn test_monitor_request_is_single_interval_field() {
        let tree = decode_value(&encode(&MonitorRequest { interval: 30 }).unwrap()).unwrap();
        let fields = tree.into_record().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "Interval");
    }

    #[test]
    fn test_close_request_rejects_balance_request_fields() {
        let bytes = encode(&BalanceRequest::default()).unwrap();
        let mut close = CloseAccountRequest::default();
        assert!(decode(&bytes, &mut close).is_err());
    }
}
