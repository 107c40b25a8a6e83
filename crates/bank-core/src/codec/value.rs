//! The closed value model that every native type is converted to and from.
//!
//! # Why a value tree? (for beginners)
//!
//! The codec never receives a schema.  Instead, each node of the byte stream
//! says what it is (its kind tag), and the decoder trusts that description.
//! To get there, native Rust values are first turned into a [`Value`], a
//! small enum that can describe any supported shape, and the encoder walks
//! that tree.  On the way back the decoder rebuilds a `Value` from the bytes
//! and the destination type pulls what it needs out of it.
//!
//! ```text
//! Account { Number: 7, HolderName: "Alice" }
//!   └─ Value::Record([
//!        ("Number",     Value::Int(Integer { bits: 7, signed: true })),
//!        ("HolderName", Value::Text("Alice")),
//!      ])
//! ```

use std::fmt;

use crate::codec::kind::Kind;
use crate::codec::traits::{Decode, Encode};
use crate::codec::{decode_opaque, encode, CodecError};

// ── Integer ───────────────────────────────────────────────────────────────────

/// An integer of any width, stored as 64 bits plus its signedness.
///
/// Storing the already-extended 64-bit pattern makes the width rules cheap:
/// reading a narrower destination is a plain truncating cast (drops the
/// most-significant bytes) and reading a wider one is the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer {
    bits: u64,
    signed: bool,
}

impl Integer {
    /// A signed integer.
    pub fn from_signed(value: i64) -> Self {
        Self {
            bits: value as u64,
            signed: true,
        }
    }

    /// An unsigned integer.
    pub fn from_unsigned(value: u64) -> Self {
        Self {
            bits: value,
            signed: false,
        }
    }

    /// Rebuilds an integer from a big-endian payload of at most 8 bytes.
    ///
    /// A signed payload whose top bit is set is padded with `0xFF`; everything
    /// else is padded with `0x00`.
    pub(crate) fn from_be_payload(payload: &[u8], signed: bool) -> Self {
        debug_assert!(payload.len() <= 8);
        let negative = signed && payload.first().is_some_and(|b| b & 0x80 != 0);
        let mut padded = if negative { [0xFF; 8] } else { [0x00; 8] };
        padded[8 - payload.len()..].copy_from_slice(payload);
        Self {
            bits: u64::from_be_bytes(padded),
            signed,
        }
    }

    /// Returns `true` when the value came from (or is destined for) a signed type.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The value reinterpreted as `i64`.
    pub fn as_i64(&self) -> i64 {
        self.bits as i64
    }

    /// The value reinterpreted as `u64`.
    pub fn as_u64(&self) -> u64 {
        self.bits
    }

    /// Smallest width (in bytes) that still preserves sign and magnitude.
    pub(crate) fn min_width(&self) -> usize {
        if self.signed {
            let v = self.as_i64();
            if i8::try_from(v).is_ok() {
                1
            } else if i16::try_from(v).is_ok() {
                2
            } else if i32::try_from(v).is_ok() {
                4
            } else {
                8
            }
        } else {
            let v = self.bits;
            if v <= u8::MAX as u64 {
                1
            } else if v <= u16::MAX as u64 {
                2
            } else if v <= u32::MAX as u64 {
                4
            } else {
                8
            }
        }
    }

    /// The kind tag and big-endian payload used on the wire.
    pub(crate) fn to_wire(self) -> (Kind, Vec<u8>) {
        let width = self.min_width();
        let kind = if self.signed {
            Kind::signed_of_width(width)
        } else {
            Kind::unsigned_of_width(width)
        };
        let bytes = self.bits.to_be_bytes();
        (kind, bytes[8 - width..].to_vec())
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed {
            write!(f, "{}", self.as_i64())
        } else {
            write!(f, "{}", self.as_u64())
        }
    }
}

// ── Opaque ────────────────────────────────────────────────────────────────────

/// The raw sub-encoding of a value whose type is only known later.
///
/// Use [`Opaque::wrap`] to put any encodable value into an "any"-typed slot.
/// After decoding, the slot holds the raw bytes; call [`Opaque::decode_into`]
/// (or [`crate::codec::decode_opaque`]) with a concrete destination to
/// materialise it.  The second step is always explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Opaque(Vec<u8>);

impl Opaque {
    /// Encodes `value` into a new opaque slot.
    ///
    /// # Errors
    ///
    /// Returns any [`CodecError`] produced while encoding `value`.
    pub fn wrap<T: Encode + ?Sized>(value: &T) -> Result<Self, CodecError> {
        Ok(Self(encode(value)?))
    }

    /// Wraps bytes that already hold a complete encoding.
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Second-phase decode of the held bytes into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the bytes do not fit `dest`.
    pub fn decode_into<T: Decode + ?Sized>(&self, dest: &mut T) -> Result<(), CodecError> {
        decode_opaque(self, dest)
    }
}

// ── Value ─────────────────────────────────────────────────────────────────────

/// Any value the codec can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(Integer),
    F32(f32),
    F64(f64),
    Text(String),
    /// Named fields in declaration order.
    Record(Vec<(String, Value)>),
    Sequence(Vec<Value>),
    /// Key/value pairs.  Order carries no meaning.
    Map(Vec<(Value, Value)>),
    Opaque(Opaque),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
}

impl Value {
    /// Human-readable name of the value's category, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(i) if i.is_signed() => "signed integer",
            Value::Int(_) => "unsigned integer",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Opaque(_) => "opaque",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Unwraps a record into its fields.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ShapeMismatch`] for any other kind.
    pub fn into_record(self) -> Result<Vec<(String, Value)>, CodecError> {
        match self {
            Value::Record(fields) => Ok(fields),
            other => Err(CodecError::mismatch("record", other.kind_name())),
        }
    }

    /// Looks up a record field by name without consuming the value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// An empty record, the natural starting point for decoding an envelope body.
impl Default for Value {
    fn default() -> Self {
        Value::Record(Vec::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (idx, (key, value)) in pairs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Opaque(raw) => write!(f, "<opaque, {} bytes>", raw.len()),
            Value::Timestamp(ms) => write!(f, "{ms}ms since epoch"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
