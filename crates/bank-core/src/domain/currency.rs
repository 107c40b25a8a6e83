//! ISO-4217 currency codes accepted by the banking server.

use std::fmt;
use std::str::FromStr;

use crate::codec::{CodecError, Decode, Encode, Value};

/// Three-letter codes the server knows about.  Sorted, so lookups can use a
/// binary search.
const KNOWN_CODES: [&str; 156] = [
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
    "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYR", "BZD", "CAD",
    "CDF", "CHF", "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
    "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ",
    "GYD", "HKD", "HNL", "HRK", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD",
    "JOD", "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP",
    "LKR", "LRD", "LSL", "LTL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRO",
    "MUR", "MVR", "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR",
    "PAB", "PEN", "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF", "SAR",
    "SBD", "SCR", "SDG", "SEK", "SGD", "SHP", "SLL", "SOS", "SRD", "SSP", "STD", "SYP", "SZL",
    "THB", "TJS", "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "UYU",
    "UZS", "VEF", "VND", "VUV", "WST", "XAF", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMK", "ZWL",
];

/// Returned when a string is not a known currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency: {0:?}")]
pub struct InvalidCurrency(pub String);

/// A currency code such as `"SGD"`.
///
/// Values built with [`str::parse`] are always known codes.  Values decoded
/// from a server reply are taken as sent; use [`Currency::is_known`] to check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code is in the accepted list.
    pub fn is_known(&self) -> bool {
        KNOWN_CODES.binary_search(&self.0.as_str()).is_ok()
    }
}

impl FromStr for Currency {
    type Err = InvalidCurrency;

    /// Accepts lowercase input and normalises it to uppercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = Currency(s.trim().to_ascii_uppercase());
        if code.is_known() {
            Ok(code)
        } else {
            Err(InvalidCurrency(s.to_owned()))
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Encode for Currency {
    fn to_value(&self) -> Result<Value, CodecError> {
        self.0.to_value()
    }
}

impl Decode for Currency {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        self.0.decode_from(value)
    }
}
