use std::io;
use thiserror::Error;

/// Errors that can occur while writing a canonical value.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// An io error prevented the write from completing.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur while reading a canonical value.
///
/// Mirrors the failure modes named in the codec contract: a truncated
/// reader surfaces as `UnexpectedEof`, a length prefix past the maximum
/// representable value surfaces as `Overflow`, and an element count whose
/// total byte footprint would exceed the sanity ceiling surfaces as
/// `SliceTooLarge` before any allocation is attempted.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The reader ran out of bytes before a value could be fully decoded.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A variable-length prefix encoded a value larger than 2^29-1.
    #[error("length prefix overflow")]
    Overflow,

    /// A slice's declared element count, multiplied by its element size,
    /// exceeds the 5 MiB sanity ceiling.
    #[error("slice too large to decode")]
    SliceTooLarge,

    /// A lower-level io error, distinct from a clean EOF.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Decoded bytes did not form a valid value of the target type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<DecodeError> for EncodeError {
    fn from(_: DecodeError) -> Self {
        // Decoding never occurs while encoding; this exists only so that
        // `?` composes across helper functions shared by both directions.
        EncodeError::Io(io::Error::new(io::ErrorKind::Other, "unreachable"))
    }
}

pub(crate) fn io_to_decode(e: io::Error) -> DecodeError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof
    } else {
        DecodeError::Io(e)
    }
}
