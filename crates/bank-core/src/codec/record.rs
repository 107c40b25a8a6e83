//! The `record!` macro: registers a struct's fields under their wire names.
//!
//! # How records are matched (for beginners)
//!
//! A record travels as a list of `(name, value)` pairs.  The receiver does not
//! care about field order; it looks every incoming name up in a table of the
//! fields it knows about.  `record!` writes that table for you:
//!
//! ```
//! use bank_core::record;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! record!(Point {
//!     x => "X",
//!     y => "Y",
//! });
//!
//! let bytes = bank_core::codec::encode(&Point { x: 1, y: -2 }).unwrap();
//! let mut back = Point::default();
//! bank_core::codec::decode(&bytes, &mut back).unwrap();
//! assert_eq!(back, Point { x: 1, y: -2 });
//! ```
//!
//! Fields missing from the stream keep whatever value the destination already
//! held.  A name in the stream that is not in the table is an
//! [`UnknownField`](crate::codec::CodecError::UnknownField) error.

/// Implements [`Encode`](crate::codec::Encode) and
/// [`Decode`](crate::codec::Decode) for a struct by listing
/// `field => "WireName"` pairs.
///
/// Fields are encoded in the listed order.  Every listed field type must
/// implement both traits.
#[macro_export]
macro_rules! record {
    ($ty:ident { $($field:ident => $wire:literal),* $(,)? }) => {
        impl $crate::codec::Encode for $ty {
            fn to_value(
                &self,
            ) -> ::std::result::Result<$crate::codec::Value, $crate::codec::CodecError> {
                ::std::result::Result::Ok($crate::codec::Value::Record(::std::vec![
                    $((
                        ::std::string::String::from($wire),
                        $crate::codec::Encode::to_value(&self.$field)?,
                    ),)*
                ]))
            }
        }

        impl $crate::codec::Decode for $ty {
            fn decode_from(
                &mut self,
                value: $crate::codec::Value,
            ) -> ::std::result::Result<(), $crate::codec::CodecError> {
                for (name, field) in value.into_record()? {
                    match name.as_str() {
                        $($wire => $crate::codec::Decode::decode_from(&mut self.$field, field)?,)*
                        other => {
                            let _ = field;
                            return ::std::result::Result::Err(
                                $crate::codec::CodecError::UnknownField(other.to_owned()),
                            );
                        }
                    }
                }
                ::std::result::Result::Ok(())
            }
        }
    };
}

// ── Tests ─────────────────────────────────────────────────────────────────────
