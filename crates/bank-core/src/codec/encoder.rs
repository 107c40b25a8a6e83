//! Serializes a [`Value`] tree into the type-tagged wire format.
//!
//! Wire format, one node at a time:
//! ```text
//! integer / bool / float   [tag:1][len:1][big-endian bytes:len]
//! text                     [tag:1][len:8][utf-8 bytes]
//! record                   [tag:1][count:1]([name as text][value])*
//! sequence                 [tag:1][count:8][value]*
//! map                      [tag:1][count:8]([key][value])*
//! opaque                   [tag:1][len:8][raw sub-encoding]
//! timestamp                [tag:1][signed integer node, ms since epoch]
//! ```
//! All multi-byte lengths are big-endian.

use crate::codec::kind::Kind;
use crate::codec::value::{Integer, Value};
use crate::codec::CodecError;

/// Appends the encoding of `value` to `buf`.
///
/// # Errors
///
/// Returns [`CodecError::TooManyFields`] when a record has more than 255
/// fields.  On error `buf` may hold a partial encoding.
pub fn encode_value(value: &Value, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    match value {
        Value::Bool(b) => {
            buf.push(Kind::Bool as u8);
            buf.push(1);
            buf.push(u8::from(*b));
        }
        Value::Int(i) => write_integer(buf, *i),
        Value::F32(v) => {
            buf.push(Kind::Float32 as u8);
            buf.push(4);
            buf.extend_from_slice(&v.to_be_bytes());
        }
        Value::F64(v) => {
            buf.push(Kind::Float64 as u8);
            buf.push(8);
            buf.extend_from_slice(&v.to_be_bytes());
        }
        Value::Text(s) => write_text(buf, s),
        Value::Record(fields) => {
            let count =
                u8::try_from(fields.len()).map_err(|_| CodecError::TooManyFields(fields.len()))?;
            buf.push(Kind::Record as u8);
            buf.push(count);
            for (name, field) in fields {
                write_text(buf, name);
                encode_value(field, buf)?;
            }
        }
        Value::Sequence(items) => {
            buf.push(Kind::Sequence as u8);
            write_len(buf, items.len());
            for item in items {
                encode_value(item, buf)?;
            }
        }
        Value::Map(pairs) => {
            buf.push(Kind::Map as u8);
            write_len(buf, pairs.len());
            for (key, val) in pairs {
                encode_value(key, buf)?;
                encode_value(val, buf)?;
            }
        }
        Value::Opaque(raw) => {
            buf.push(Kind::Opaque as u8);
            write_len(buf, raw.len());
            buf.extend_from_slice(raw.as_bytes());
        }
        Value::Timestamp(ms) => {
            buf.push(Kind::Timestamp as u8);
            write_integer(buf, Integer::from_signed(*ms));
        }
    }
    Ok(())
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn write_integer(buf: &mut Vec<u8>, value: Integer) {
    let (kind, bytes) = value.to_wire();
    buf.push(kind as u8);
    // Width is at most 8, so it always fits the one-byte length.
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(&bytes);
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    buf.push(Kind::Text as u8);
    write_len(buf, s.len());
    buf.extend_from_slice(s.as_bytes());
}

/// Writes an 8-byte big-endian length or count.
fn write_len(buf: &mut Vec<u8>, len: usize) {
    buf.extend_from_slice(&(len as u64).to_be_bytes());
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::value::Opaque;

    fn bytes_of(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_value(value, &mut buf).expect("encode failed");
        buf
    }

    #[test]
    fn test_bool_layout() {
        assert_eq!(bytes_of(&Value::Bool(true)), vec![1, 1, 1]);
        assert_eq!(bytes_of(&Value::Bool(false)), vec![1, 1, 0]);
    }

    #[test]
    fn test_unsigned_200_uses_one_payload_byte() {
        let buf = bytes_of(&Value::Int(Integer::from_unsigned(200)));
        assert_eq!(buf, vec![Kind::Uint8 as u8, 1, 200]);
    }

    #[test]
    fn test_70000_uses_four_payload_bytes() {
        let buf = bytes_of(&Value::Int(Integer::from_signed(70_000)));
        assert_eq!(buf[0], Kind::Int32 as u8);
        assert_eq!(buf[1], 4);
        assert_eq!(&buf[2..], &70_000i32.to_be_bytes());
    }

    #[test]
    fn test_negative_one_is_single_ff_byte() {
        let buf = bytes_of(&Value::Int(Integer::from_signed(-1)));
        assert_eq!(buf, vec![Kind::Int8 as u8, 1, 0xFF]);
    }

    #[test]
    fn test_floats_keep_their_width() {
        let buf = bytes_of(&Value::F32(1.0));
        assert_eq!(buf[..2], [Kind::Float32 as u8, 4]);
        let buf = bytes_of(&Value::F64(1.0));
        assert_eq!(buf[..2], [Kind::Float64 as u8, 8]);
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_text_has_eight_byte_length_prefix() {
        let buf = bytes_of(&Value::Text("hi".into()));
        assert_eq!(buf, vec![24, 0, 0, 0, 0, 0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn test_record_layout_starts_with_tag_and_field_count() {
        let buf = bytes_of(&Value::Record(vec![(
            "A".to_string(),
            Value::Bool(true),
        )]));
        assert_eq!(buf[0], Kind::Record as u8);
        assert_eq!(buf[1], 1);
        // Field name is a complete text node.
        assert_eq!(buf[2], Kind::Text as u8);
    }

    #[test]
    fn test_record_with_256_fields_is_rejected() {
        let fields = (0..256)
            .map(|i| (format!("F{i}"), Value::Bool(false)))
            .collect();
        let mut buf = Vec::new();
        let err = encode_value(&Value::Record(fields), &mut buf).unwrap_err();
        assert_eq!(err, CodecError::TooManyFields(256));
    }

    #[test]
    fn test_opaque_wraps_raw_bytes_with_length() {
        let raw = Opaque::from_raw(vec![1, 1, 1]);
        let buf = bytes_of(&Value::Opaque(raw));
        assert_eq!(buf, vec![20, 0, 0, 0, 0, 0, 0, 0, 3, 1, 1, 1]);
    }

    #[test]
    fn test_timestamp_is_tag_followed_by_integer_node() {
        let buf = bytes_of(&Value::Timestamp(1_000));
        assert_eq!(buf[0], Kind::Timestamp as u8);
        assert_eq!(buf[1], Kind::Int16 as u8);
        assert_eq!(buf[2], 2);
        assert_eq!(&buf[3..], &1_000i16.to_be_bytes());
    }

    #[test]
    fn test_empty_sequence_and_map_carry_zero_count() {
        assert_eq!(bytes_of(&Value::Sequence(vec![])), vec![23, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes_of(&Value::Map(vec![])), vec![21, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
}
