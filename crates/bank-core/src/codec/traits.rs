//! Conversions between native Rust types and the [`Value`] tree.
//!
//! [`Encode`] turns a value into a tree the encoder can write; [`Decode`]
//! assigns a decoded tree into an existing, exclusively borrowed destination.
//!
//! Decoding *into* a slot (rather than returning a new value) is what lets a
//! record keep the defaults of fields the stream does not mention, and lets an
//! `Option` or `Box` be materialised in place.
//!
//! Records implement both traits through the [`record!`](crate::record) macro.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::codec::value::{Integer, Opaque, Value};
use crate::codec::CodecError;

/// A type that can describe itself as a [`Value`].
pub trait Encode {
    /// Builds the value tree for `self`.
    ///
    /// # Errors
    ///
    /// [`CodecError::AbsentReference`] when an `Option` on the path is `None`;
    /// anything the nested encoders report.
    fn to_value(&self) -> Result<Value, CodecError>;
}

/// A type that can be overwritten from a decoded [`Value`].
pub trait Decode {
    /// Assigns `value` into `self`.
    ///
    /// On error `self` may be partially updated; callers that need
    /// all-or-nothing behaviour decode into a scratch value first.
    ///
    /// # Errors
    ///
    /// [`CodecError::ShapeMismatch`] when the value's kind does not fit,
    /// [`CodecError::UnknownField`] for stray record fields.
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError>;
}

// ── Scalars ───────────────────────────────────────────────────────────────────

impl Encode for bool {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::Bool(*self))
    }
}

impl Decode for bool {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(CodecError::mismatch("bool", other.kind_name())),
        }
    }
}

/// Integers of either signedness decode into any integer destination: the
/// stored 64-bit pattern is truncated to the destination width.
macro_rules! impl_integer {
    ($ctor:ident as $wide:ty => $($t:ty),+) => {$(
        impl Encode for $t {
            fn to_value(&self) -> Result<Value, CodecError> {
                Ok(Value::Int(Integer::$ctor(*self as $wide)))
            }
        }

        impl Decode for $t {
            fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
                match value {
                    Value::Int(i) => {
                        *self = i.as_u64() as $t;
                        Ok(())
                    }
                    other => Err(CodecError::mismatch(stringify!($t), other.kind_name())),
                }
            }
        }
    )+};
}

impl_integer!(from_signed as i64 => i8, i16, i32, i64, isize);
impl_integer!(from_unsigned as u64 => u8, u16, u32, u64, usize);

impl Encode for f32 {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::F32(*self))
    }
}

impl Decode for f32 {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        match value {
            Value::F32(v) => *self = v,
            Value::F64(v) => *self = v as f32,
            other => return Err(CodecError::mismatch("f32", other.kind_name())),
        }
        Ok(())
    }
}

impl Encode for f64 {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::F64(*self))
    }
}

impl Decode for f64 {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        match value {
            Value::F64(v) => *self = v,
            Value::F32(v) => *self = f64::from(v),
            other => return Err(CodecError::mismatch("f64", other.kind_name())),
        }
        Ok(())
    }
}

impl Encode for str {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::Text(self.to_owned()))
    }
}

impl Encode for String {
    fn to_value(&self) -> Result<Value, CodecError> {
        self.as_str().to_value()
    }
}

impl Decode for String {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        match value {
            Value::Text(s) => {
                *self = s;
                Ok(())
            }
            other => Err(CodecError::mismatch("text", other.kind_name())),
        }
    }
}

// ── Indirections ──────────────────────────────────────────────────────────────

impl<T: Encode + ?Sized> Encode for &T {
    fn to_value(&self) -> Result<Value, CodecError> {
        (**self).to_value()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn to_value(&self) -> Result<Value, CodecError> {
        (**self).to_value()
    }
}

impl<T: Decode + ?Sized> Decode for Box<T> {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        (**self).decode_from(value)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn to_value(&self) -> Result<Value, CodecError> {
        match self {
            Some(inner) => inner.to_value(),
            None => Err(CodecError::AbsentReference),
        }
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        self.get_or_insert_with(T::default).decode_from(value)
    }
}

// ── Sequences ─────────────────────────────────────────────────────────────────

impl<T: Encode> Encode for [T] {
    fn to_value(&self) -> Result<Value, CodecError> {
        self.iter()
            .map(|item| item.to_value())
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn to_value(&self) -> Result<Value, CodecError> {
        self.as_slice().to_value()
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let items = match value {
            Value::Sequence(items) => items,
            other => return Err(CodecError::mismatch("sequence", other.kind_name())),
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let mut slot = T::default();
            slot.decode_from(item)?;
            out.push(slot);
        }
        *self = out;
        Ok(())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn to_value(&self) -> Result<Value, CodecError> {
        self.as_slice().to_value()
    }
}

/// Fixed-length destinations only accept a sequence of exactly `N` items.
impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let items = match value {
            Value::Sequence(items) => items,
            other => return Err(CodecError::mismatch("array", other.kind_name())),
        };
        if items.len() != N {
            return Err(CodecError::MalformedPayload(format!(
                "expected {N} items, found {}",
                items.len()
            )));
        }
        for (slot, item) in self.iter_mut().zip(items) {
            slot.decode_from(item)?;
        }
        Ok(())
    }
}

// ── Maps ──────────────────────────────────────────────────────────────────────

fn encode_pairs<'a, K, V, I>(pairs: I) -> Result<Value, CodecError>
where
    K: Encode + 'a,
    V: Encode + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    pairs
        .map(|(k, v)| Ok((k.to_value()?, v.to_value()?)))
        .collect::<Result<Vec<_>, CodecError>>()
        .map(Value::Map)
}

fn decode_pairs<K, V>(value: Value) -> Result<Vec<(K, V)>, CodecError>
where
    K: Decode + Default,
    V: Decode + Default,
{
    let pairs = match value {
        Value::Map(pairs) => pairs,
        other => return Err(CodecError::mismatch("map", other.kind_name())),
    };
    let mut out = Vec::with_capacity(pairs.len());
    for (raw_key, raw_value) in pairs {
        let mut key = K::default();
        key.decode_from(raw_key)?;
        let mut val = V::default();
        val.decode_from(raw_value)?;
        out.push((key, val));
    }
    Ok(out)
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value, CodecError> {
        encode_pairs(self.iter())
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: std::hash::BuildHasher,
{
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let pairs = decode_pairs(value)?;
        self.clear();
        self.extend(pairs);
        Ok(())
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value, CodecError> {
        encode_pairs(self.iter())
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Default + Ord,
    V: Decode + Default,
{
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let pairs = decode_pairs(value)?;
        self.clear();
        self.extend(pairs);
        Ok(())
    }
}

// ── Timestamps ────────────────────────────────────────────────────────────────

impl Encode for SystemTime {
    fn to_value(&self) -> Result<Value, CodecError> {
        let ms = match self.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_millis())
                .map(|ms| -ms)
                .unwrap_or(i64::MIN),
        };
        Ok(Value::Timestamp(ms))
    }
}

impl Decode for SystemTime {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        let ms = match value {
            Value::Timestamp(ms) => ms,
            other => return Err(CodecError::mismatch("timestamp", other.kind_name())),
        };
        let offset = Duration::from_millis(ms.unsigned_abs());
        let time = if ms >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        *self = time.ok_or_else(|| {
            CodecError::MalformedPayload(format!("timestamp {ms}ms is out of range"))
        })?;
        Ok(())
    }
}

// ── Opaque and raw values ─────────────────────────────────────────────────────

impl Encode for Opaque {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(Value::Opaque(self.clone()))
    }
}

impl Decode for Opaque {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        match value {
            Value::Opaque(raw) => {
                *self = raw;
                Ok(())
            }
            other => Err(CodecError::mismatch("opaque", other.kind_name())),
        }
    }
}

impl Encode for Value {
    fn to_value(&self) -> Result<Value, CodecError> {
        Ok(self.clone())
    }
}

/// A `Value` destination accepts anything; useful when the response shape is
/// not known in advance.
impl Decode for Value {
    fn decode_from(&mut self, value: Value) -> Result<(), CodecError> {
        *self = value;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
