//! The one-byte kind tag that starts every encoded value.
//!
//! # Why these particular numbers?
//!
//! The tag values follow the numbering the banking server has always used for
//! its value categories (bool = 1, int = 2, …, struct = 25, time = 27).  Gaps
//! in the numbering belong to kinds that exist in that vocabulary but can never
//! be put on the wire, such as function values or raw pointers.  Keeping the
//! same numbers means a byte dump of a datagram reads the same on both sides.
//!
//! ```text
//!  1 Bool       2 Int       3 Int8      4 Int16     5 Int32     6 Int64
//!  7 Uint       8 Uint8     9 Uint16   10 Uint32   11 Uint64
//! 13 Float32   14 Float64  17 Array    20 Opaque   21 Map      22 Reference
//! 23 Sequence  24 Text     25 Record   27 Timestamp
//! ```

use std::fmt;

/// Tag bytes that name kinds which cannot be represented in a stream:
/// invalid (0), uintptr (12), complex64 (15), complex128 (16), channel (18),
/// function (19) and raw pointer (26).
const UNSUPPORTED_TAGS: [u8; 7] = [0, 12, 15, 16, 18, 19, 26];

/// Identifies the shape of the value that follows in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Bool = 1,
    /// Platform-width signed integer.  Decoded exactly like [`Kind::Int64`].
    Int = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    /// Platform-width unsigned integer.  Decoded exactly like [`Kind::Uint64`].
    Uint = 7,
    Uint8 = 8,
    Uint16 = 9,
    Uint32 = 10,
    Uint64 = 11,
    Float32 = 13,
    Float64 = 14,
    /// Fixed-length sequence.  Decoded exactly like [`Kind::Sequence`].
    Array = 17,
    Opaque = 20,
    Map = 21,
    /// Marks a value reached through an indirection.  Never emitted by the
    /// encoder; the decoder skips it and reads the value behind it.
    Reference = 22,
    Sequence = 23,
    Text = 24,
    Record = 25,
    Timestamp = 27,
}

/// Why a tag byte could not be turned into a [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    /// The byte names a kind that can never be encoded.
    #[error("tag {0} names a kind that cannot be encoded")]
    Unsupported(u8),
    /// The byte is outside the vocabulary altogether.
    #[error("tag {0} is not a known kind")]
    Unknown(u8),
}

impl TryFrom<u8> for Kind {
    type Error = KindError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Kind::Bool),
            2 => Ok(Kind::Int),
            3 => Ok(Kind::Int8),
            4 => Ok(Kind::Int16),
            5 => Ok(Kind::Int32),
            6 => Ok(Kind::Int64),
            7 => Ok(Kind::Uint),
            8 => Ok(Kind::Uint8),
            9 => Ok(Kind::Uint16),
            10 => Ok(Kind::Uint32),
            11 => Ok(Kind::Uint64),
            13 => Ok(Kind::Float32),
            14 => Ok(Kind::Float64),
            17 => Ok(Kind::Array),
            20 => Ok(Kind::Opaque),
            21 => Ok(Kind::Map),
            22 => Ok(Kind::Reference),
            23 => Ok(Kind::Sequence),
            24 => Ok(Kind::Text),
            25 => Ok(Kind::Record),
            27 => Ok(Kind::Timestamp),
            other if UNSUPPORTED_TAGS.contains(&other) => Err(KindError::Unsupported(other)),
            other => Err(KindError::Unknown(other)),
        }
    }
}

impl Kind {
    /// Returns `true` for every integer kind, signed or unsigned.
    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// Returns `true` for `Int`, `Int8`, `Int16`, `Int32` and `Int64`.
    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    /// Returns `true` for `Uint`, `Uint8`, `Uint16`, `Uint32` and `Uint64`.
    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64
        )
    }

    /// The signed integer kind whose width is `width` bytes.
    ///
    /// Only called with widths produced by the smallest-width rule (1, 2, 4, 8).
    pub(crate) fn signed_of_width(width: usize) -> Kind {
        match width {
            1 => Kind::Int8,
            2 => Kind::Int16,
            4 => Kind::Int32,
            _ => Kind::Int64,
        }
    }

    /// The unsigned integer kind whose width is `width` bytes.
    pub(crate) fn unsigned_of_width(width: usize) -> Kind {
        match width {
            1 => Kind::Uint8,
            2 => Kind::Uint16,
            4 => Kind::Uint32,
            _ => Kind::Uint64,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Array => "array",
            Kind::Opaque => "opaque",
            Kind::Map => "map",
            Kind::Reference => "reference",
            Kind::Sequence => "sequence",
            Kind::Text => "text",
            Kind::Record => "record",
            Kind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_round_trips_through_its_tag_byte() {
        let all = [
            Kind::Bool,
            Kind::Int,
            Kind::Int8,
            Kind::Int16,
            Kind::Int32,
            Kind::Int64,
            Kind::Uint,
            Kind::Uint8,
            Kind::Uint16,
            Kind::Uint32,
            Kind::Uint64,
            Kind::Float32,
            Kind::Float64,
            Kind::Array,
            Kind::Opaque,
            Kind::Map,
            Kind::Reference,
            Kind::Sequence,
            Kind::Text,
            Kind::Record,
            Kind::Timestamp,
        ];
        for kind in all {
            assert_eq!(Kind::try_from(kind as u8), Ok(kind));
        }
    }

    #[test]
    fn test_function_and_channel_tags_are_unsupported() {
        assert_eq!(Kind::try_from(19), Err(KindError::Unsupported(19)));
        assert_eq!(Kind::try_from(18), Err(KindError::Unsupported(18)));
        assert_eq!(Kind::try_from(0), Err(KindError::Unsupported(0)));
    }

    #[test]
    fn test_kind_error_displays_the_tag() {
        assert_eq!(
            KindError::Unknown(0xEE).to_string(),
            "tag 238 is not a known kind"
        );
        assert_eq!(
            KindError::Unsupported(19).to_string(),
            "tag 19 names a kind that cannot be encoded"
        );
    }

    #[test]
    fn test_out_of_vocabulary_tag_is_unknown() {
        assert_eq!(Kind::try_from(0xEE), Err(KindError::Unknown(0xEE)));
        assert_eq!(Kind::try_from(28), Err(KindError::Unknown(28)));
    }

    #[test]
    fn test_signedness_helpers() {
        assert!(Kind::Int.is_signed_integer());
        assert!(Kind::Uint16.is_unsigned_integer());
        assert!(!Kind::Float64.is_integer());
        assert!(!Kind::Bool.is_integer());
    }

    #[test]
    fn test_width_helpers_pick_matching_kinds() {
        assert_eq!(Kind::signed_of_width(1), Kind::Int8);
        assert_eq!(Kind::signed_of_width(8), Kind::Int64);
        assert_eq!(Kind::unsigned_of_width(2), Kind::Uint16);
        assert_eq!(Kind::unsigned_of_width(4), Kind::Uint32);
    }
}
