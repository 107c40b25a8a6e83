//! Parses the type-tagged wire format back into a [`Value`] tree.
//!
//! The stream is self-describing, so this stage needs no destination type.
//! Fitting the tree into a concrete Rust type is the job of the
//! [`Decode`](crate::codec::Decode) trait, which runs afterwards.
//!
//! Opaque nodes are *not* parsed here: their raw bytes are kept verbatim so
//! the caller can decode them later against a type chosen at that point.

use tracing::trace;

use crate::codec::kind::{Kind, KindError};
use crate::codec::value::{Integer, Opaque, Value};
use crate::codec::CodecError;

/// Deepest nesting accepted before the stream is rejected as malformed.
///
/// Datagrams come from the network, so recursion depth must be bounded.
pub const MAX_DEPTH: usize = 64;

/// Parses exactly one value from `bytes`.
///
/// # Errors
///
/// - [`CodecError::TruncatedStream`] if a tag or length promises more bytes
///   than remain.
/// - [`CodecError::UnknownKind`] / [`CodecError::UnsupportedKind`] for tag
///   bytes outside the representable vocabulary.
/// - [`CodecError::MalformedPayload`] for invalid content.
/// - [`CodecError::TrailingBytes`] if anything follows the value.
pub fn decode_value(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_value(0)?;
    if reader.remaining() > 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }
    trace!(kind = value.kind_name(), len = bytes.len(), "decoded value");
    Ok(value)
}

/// A forward-only cursor over the input bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedStream {
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    /// Reads an 8-byte big-endian length or count.
    fn read_len(&mut self) -> Result<usize, CodecError> {
        let raw = self.take(8)?;
        let mut be = [0u8; 8];
        be.copy_from_slice(raw);
        let len = u64::from_be_bytes(be);
        usize::try_from(len)
            .map_err(|_| CodecError::MalformedPayload(format!("length {len} does not fit in memory")))
    }

    fn read_kind(&mut self) -> Result<Kind, CodecError> {
        let tag = self.read_u8()?;
        Kind::try_from(tag).map_err(|e| match e {
            KindError::Unsupported(b) => CodecError::UnsupportedKind(b),
            KindError::Unknown(b) => CodecError::UnknownKind(b),
        })
    }

    /// Reads `[len:1][bytes:len]` for numeric kinds.
    fn read_numeric_payload(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_u8()? as usize;
        if len > 8 {
            return Err(CodecError::MalformedPayload(format!(
                "numeric payload of {len} bytes exceeds 8"
            )));
        }
        self.take(len)
    }

    fn read_text(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| CodecError::MalformedPayload(format!("invalid UTF-8: {e}")))
    }

    /// Capacity hint for a collection of `count` items.
    ///
    /// Every item needs at least two bytes, so a count larger than that cannot
    /// be honest; the cap keeps a hostile count from forcing a huge allocation.
    fn capacity_for(&self, count: usize) -> usize {
        count.min(self.remaining() / 2)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::MalformedPayload(format!(
                "nesting deeper than {MAX_DEPTH} levels"
            )));
        }

        let kind = self.read_kind()?;
        match kind {
            Kind::Reference => self.read_value(depth + 1),
            Kind::Bool => {
                let payload = self.read_numeric_payload()?;
                match payload {
                    [b] => Ok(Value::Bool(*b != 0)),
                    _ => Err(CodecError::MalformedPayload(format!(
                        "bool payload must be 1 byte, got {}",
                        payload.len()
                    ))),
                }
            }
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => {
                let payload = self.read_numeric_payload()?;
                Ok(Value::Int(Integer::from_be_payload(payload, true)))
            }
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 => {
                let payload = self.read_numeric_payload()?;
                Ok(Value::Int(Integer::from_be_payload(payload, false)))
            }
            Kind::Float32 | Kind::Float64 => {
                // The payload length, not the tag, decides the float width.
                let payload = self.read_numeric_payload()?;
                match payload.len() {
                    4 => {
                        let mut be = [0u8; 4];
                        be.copy_from_slice(payload);
                        Ok(Value::F32(f32::from_be_bytes(be)))
                    }
                    8 => {
                        let mut be = [0u8; 8];
                        be.copy_from_slice(payload);
                        Ok(Value::F64(f64::from_be_bytes(be)))
                    }
                    n => Err(CodecError::MalformedPayload(format!(
                        "float payload must be 4 or 8 bytes, got {n}"
                    ))),
                }
            }
            Kind::Text => Ok(Value::Text(self.read_text()?)),
            Kind::Record => {
                let count = self.read_u8()? as usize;
                let mut fields = Vec::with_capacity(count);
                for _ in 0..count {
                    let name = match self.read_value(depth + 1)? {
                        Value::Text(name) => name,
                        other => {
                            return Err(CodecError::MalformedPayload(format!(
                                "record field name must be text, found {}",
                                other.kind_name()
                            )))
                        }
                    };
                    let value = self.read_value(depth + 1)?;
                    fields.push((name, value));
                }
                Ok(Value::Record(fields))
            }
            Kind::Array | Kind::Sequence => {
                let count = self.read_len()?;
                let mut items = Vec::with_capacity(self.capacity_for(count));
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(Value::Sequence(items))
            }
            Kind::Map => {
                let count = self.read_len()?;
                let mut pairs = Vec::with_capacity(self.capacity_for(count) / 2);
                for _ in 0..count {
                    let key = self.read_value(depth + 1)?;
                    let value = self.read_value(depth + 1)?;
                    pairs.push((key, value));
                }
                Ok(Value::Map(pairs))
            }
            Kind::Opaque => {
                let len = self.read_len()?;
                let raw = self.take(len)?;
                Ok(Value::Opaque(Opaque::from_raw(raw.to_vec())))
            }
            Kind::Timestamp => match self.read_value(depth + 1)? {
                Value::Int(ms) => Ok(Value::Timestamp(ms.as_i64())),
                other => Err(CodecError::MalformedPayload(format!(
                    "timestamp must wrap an integer, found {}",
                    other.kind_name()
                ))),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::encode_value;

    fn round_trip(value: &Value) -> Value {
        let mut buf = Vec::new();
        encode_value(value, &mut buf).expect("encode failed");
        decode_value(&buf).expect("decode failed")
    }

    #[test]
    fn test_nested_tree_round_trip() {
        let value = Value::Record(vec![
            ("Name".to_string(), Value::Text("Alice".to_string())),
            ("Balance".to_string(), Value::F64(-42.5)),
            (
                "History".to_string(),
                Value::Sequence(vec![
                    Value::Int(Integer::from_signed(-3)),
                    Value::Int(Integer::from_unsigned(70_000)),
                ]),
            ),
            (
                "Meta".to_string(),
                Value::Map(vec![(
                    Value::Text("k".to_string()),
                    Value::Opaque(Opaque::from_raw(vec![1, 1, 0])),
                )]),
            ),
            ("At".to_string(), Value::Timestamp(1_700_000_000_000)),
        ]);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_empty_input_is_truncated() {
        assert_eq!(
            decode_value(&[]),
            Err(CodecError::TruncatedStream {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_text_shorter_than_its_length_prefix_is_truncated() {
        // Arrange: claims 5 bytes, carries 2.
        let bytes = [24, 0, 0, 0, 0, 0, 0, 0, 5, b'h', b'i'];

        // Act
        let err = decode_value(&bytes).unwrap_err();

        // Assert
        assert_eq!(
            err,
            CodecError::TruncatedStream {
                needed: 5,
                available: 2
            }
        );
    }

    #[test]
    fn test_unknown_tag_is_reported() {
        assert_eq!(decode_value(&[0x63]), Err(CodecError::UnknownKind(0x63)));
    }

    #[test]
    fn test_function_tag_is_unsupported() {
        assert_eq!(decode_value(&[19]), Err(CodecError::UnsupportedKind(19)));
    }

    #[test]
    fn test_reference_prefix_is_skipped() {
        let bytes = [22, 22, 1, 1, 1];
        assert_eq!(decode_value(&bytes), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_array_tag_decodes_as_sequence() {
        let bytes = [17, 0, 0, 0, 0, 0, 0, 0, 1, 8, 1, 9];
        assert_eq!(
            decode_value(&bytes),
            Ok(Value::Sequence(vec![Value::Int(Integer::from_unsigned(9))]))
        );
    }

    #[test]
    fn test_platform_int_with_eight_bytes_decodes() {
        let mut bytes = vec![2, 8];
        bytes.extend_from_slice(&(-7i64).to_be_bytes());
        assert_eq!(
            decode_value(&bytes),
            Ok(Value::Int(Integer::from_signed(-7)))
        );
    }

    #[test]
    fn test_numeric_payload_longer_than_eight_bytes_is_malformed() {
        let mut bytes = vec![6, 9];
        bytes.extend_from_slice(&[0; 9]);
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_float_with_odd_length_is_malformed() {
        let bytes = [14, 3, 0, 0, 0];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let bytes = [24, 0, 0, 0, 0, 0, 0, 0, 2, 0xC3, 0x28];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let bytes = [1, 1, 1, 0xAA, 0xBB];
        assert_eq!(decode_value(&bytes), Err(CodecError::TrailingBytes(2)));
    }

    #[test]
    fn test_record_field_name_must_be_text() {
        // count = 1, name is a bool node
        let bytes = [25, 1, 1, 1, 1, 1, 1, 1];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_huge_sequence_count_fails_without_allocating() {
        let mut bytes = vec![23];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        let result = decode_value(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::TruncatedStream { .. }) | Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_excessive_nesting_is_rejected() {
        let mut bytes = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            bytes.push(23);
            bytes.extend_from_slice(&1u64.to_be_bytes());
        }
        bytes.extend_from_slice(&[1, 1, 1]);
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_opaque_body_is_kept_verbatim() {
        // The inner bytes are garbage; the first phase must not look at them.
        let bytes = [20, 0, 0, 0, 0, 0, 0, 0, 2, 0xEE, 0xEE];
        assert_eq!(
            decode_value(&bytes),
            Ok(Value::Opaque(Opaque::from_raw(vec![0xEE, 0xEE])))
        );
    }
}
