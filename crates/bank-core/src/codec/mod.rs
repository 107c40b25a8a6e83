//! Schema-less, type-tagged binary codec.
//!
//! Every value on the wire starts with a one-byte [`Kind`] tag that says how
//! to read the bytes after it, so the receiver needs no shared schema.
//! Encoding goes `native → Value → bytes`; decoding goes
//! `bytes → Value → native`.
//!
//! The four entry points are:
//!
//! | Function           | Direction                                         |
//! |--------------------|---------------------------------------------------|
//! | [`encode`]         | any [`Encode`] value → bytes                      |
//! | [`decode`]         | bytes → existing [`Decode`] destination           |
//! | [`decode_value`]   | bytes → [`Value`] tree, no destination needed     |
//! | [`decode_opaque`]  | an [`Opaque`] slot → concrete destination         |

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod kind;
mod record;
pub mod traits;
pub mod value;

pub use decoder::{decode_value, MAX_DEPTH};
pub use error::CodecError;
pub use kind::Kind;
pub use traits::{Decode, Encode};
pub use value::{Integer, Opaque, Value};

/// Serializes `value` into a freshly allocated buffer.
///
/// # Errors
///
/// [`CodecError::AbsentReference`] for a `None` on the path,
/// [`CodecError::TooManyFields`] for records wider than 255 fields.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let tree = value.to_value()?;
    let mut buf = Vec::with_capacity(64);
    encoder::encode_value(&tree, &mut buf)?;
    Ok(buf)
}

/// Decodes exactly one value from `bytes` into `dest`.
///
/// Parsing finishes before `dest` is touched, so a truncated or malformed
/// stream leaves `dest` unchanged.  A shape error found while assigning may
/// leave it partially updated.
///
/// # Errors
///
/// Any [`CodecError`]; none of them are retryable.
pub fn decode<T: Decode + ?Sized>(bytes: &[u8], dest: &mut T) -> Result<(), CodecError> {
    let tree = decode_value(bytes)?;
    dest.decode_from(tree)
}

/// Second-phase decode: materialises the raw bytes of an opaque slot into a
/// concrete destination chosen by the caller.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_opaque<T: Decode + ?Sized>(opaque: &Opaque, dest: &mut T) -> Result<(), CodecError> {
    decode(opaque.as_bytes(), dest)
}
