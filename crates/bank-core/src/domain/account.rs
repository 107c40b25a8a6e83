//! The account record the server returns.

use std::fmt;

use crate::domain::currency::Currency;
use crate::record;

/// A bank account as reported by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub number: i64,
    pub holder_name: String,
    pub password: String,
    pub currency: Currency,
    pub balance: f64,
}

record!(Account {
    number => "Number",
    holder_name => "HolderName",
    password => "Password",
    currency => "Currency",
    balance => "Balance",
});

/// Renders the account details block.  The password is never printed.
impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account Number: {}", self.number)?;
        writeln!(f, "Account Holder Name: {}", self.holder_name)?;
        writeln!(f, "Account Currency: {}", self.currency)?;
        writeln!(f, "Account Balance: {:.2}", self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, decode_value, encode};

    fn sample() -> Account {
        Account {
            number: 1001,
            holder_name: "Alice".into(),
            password: "secret".into(),
            currency: "SGD".parse().unwrap(),
            balance: 250.5,
        }
    }

    #[test]
    fn test_account_round_trip() {
        let bytes = encode(&sample()).unwrap();
        let mut back = Account::default();
        decode(&bytes, &mut back).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_account_uses_server_field_names() {
        let tree = decode_value(&encode(&sample()).unwrap()).unwrap();
        for name in ["Number", "HolderName", "Password", "Currency", "Balance"] {
            assert!(tree.field(name).is_some(), "missing field {name}");
        }
    }

    #[test]
    fn test_display_hides_password() {
        let text = sample().to_string();
        assert!(text.contains("Account Number: 1001"));
        assert!(text.contains("Account Holder Name: Alice"));
        assert!(text.contains("Account Currency: SGD"));
        assert!(text.contains("Account Balance: 250.50"));
        assert!(!text.contains("secret"));
    }
}
