//! Error type shared by the encoder, the decoder and the `Encode`/`Decode` traits.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a value.
///
/// None of these are worth retrying locally: the same bytes will fail the same
/// way.  A caller that wants another chance re-sends the whole request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Fewer bytes remain than a tag or length prefix says should follow.
    #[error("truncated stream: need {needed} bytes, {available} available")]
    TruncatedStream { needed: usize, available: usize },

    /// The tag byte is not part of the kind vocabulary.
    #[error("unknown kind tag: {0}")]
    UnknownKind(u8),

    /// The tag byte names a kind that can never be encoded (function, channel,
    /// raw pointer, complex number).
    #[error("unsupported kind tag: {0}")]
    UnsupportedKind(u8),

    /// The destination cannot hold the kind found in the stream.
    #[error("shape mismatch: cannot decode {found} into {expected}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The stream carries a record field the destination does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// An `Option` holding `None` was asked to encode itself.
    #[error("cannot encode an absent reference")]
    AbsentReference,

    /// The record has more fields than the one-byte field count can express.
    #[error("record has {0} fields, at most 255 can be encoded")]
    TooManyFields(usize),

    /// The payload is structurally readable but its content is invalid
    /// (bad UTF-8, an oversized numeric length, an unknown enumeration value…).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Bytes remain after the single top-level value.
    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),
}

impl CodecError {
    /// Shorthand for a [`CodecError::ShapeMismatch`].
    pub(crate) fn mismatch(expected: &'static str, found: &'static str) -> Self {
        CodecError::ShapeMismatch { expected, found }
    }
}
