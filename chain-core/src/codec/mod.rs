//! Canonical binary codec shared by hashing, signing, and wire transfer.
//!
//! Every value that participates in a transaction ID, a signature hash, or
//! network replication round-trips through [`Encode`]/[`Decode`]. Two
//! length-prefix flavors exist side by side, selected per call via
//! [`CodecFlavor`] rather than through any global or thread-local state:
//! the compact variable-length prefix used everywhere a value is hashed or
//! signed, and a legacy fixed 8-byte little-endian length prefix kept for
//! compatibility with values minted before the compact scheme existed.

mod error;
mod varint;

pub use error::{DecodeError, EncodeError};
pub use varint::{decode_len, encode_len, MAX_LEN, MAX_SLICE_BYTES};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::marker::PhantomData;

/// Selects which length-prefix scheme an [`Encoder`]/[`Decoder`] uses for
/// variable-length values (slices, strings, `Option`).
///
/// Fixed-size values (integers, arrays, hashes) encode identically under
/// both flavors; only the prefix in front of variable-length data differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFlavor {
    /// The bit-packed variable-length prefix: one to four bytes, chosen by
    /// the smallest tier that fits the value.
    Compact,
    /// The legacy scheme: a fixed 8-byte little-endian length prefix,
    /// regardless of how small the value is.
    Legacy,
}

impl Default for CodecFlavor {
    fn default() -> Self {
        CodecFlavor::Compact
    }
}

/// A sink that canonical values encode themselves into.
pub struct Encoder<W> {
    writer: W,
    flavor: CodecFlavor,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, flavor: CodecFlavor) -> Self {
        Encoder { writer, flavor }
    }

    pub fn flavor(&self) -> CodecFlavor {
        self.flavor
    }

    pub fn write_byte(&mut self, b: u8) -> Result<(), EncodeError> {
        self.writer.write_u8(b).map_err(EncodeError::from)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.writer.write_all(bytes).map_err(EncodeError::from)
    }

    /// Writes a length prefix for a variable-length value, using whichever
    /// flavor this encoder was constructed with.
    pub fn write_len(&mut self, n: u64) -> Result<(), EncodeError> {
        match self.flavor {
            CodecFlavor::Compact => {
                let bytes = encode_len(n).map_err(|_| {
                    EncodeError::Io(io::Error::new(io::ErrorKind::InvalidInput, "length overflow"))
                })?;
                self.write_bytes(&bytes)
            }
            CodecFlavor::Legacy => self.writer.write_u64::<LittleEndian>(n).map_err(EncodeError::from),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A source that canonical values decode themselves out of.
pub struct Decoder<R> {
    reader: R,
    flavor: CodecFlavor,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R, flavor: CodecFlavor) -> Self {
        Decoder { reader, flavor }
    }

    pub fn flavor(&self) -> CodecFlavor {
        self.flavor
    }

    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        self.reader.read_u8().map_err(error::io_to_decode)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; n];
        self.reader
            .read_exact(&mut buf)
            .map_err(error::io_to_decode)?;
        Ok(buf)
    }

    /// Reads a length prefix, using whichever flavor this decoder was
    /// constructed with.
    pub fn read_len(&mut self) -> Result<u64, DecodeError> {
        match self.flavor {
            CodecFlavor::Compact => {
                let byte0 = self.read_byte()?;
                let total = varint::prefix_len(byte0);
                let mut bytes = Vec::with_capacity(total);
                bytes.push(byte0);
                if total > 1 {
                    bytes.extend(self.read_bytes(total - 1)?);
                }
                decode_len(&bytes)
            }
            CodecFlavor::Legacy => self
                .reader
                .read_u64::<LittleEndian>()
                .map_err(error::io_to_decode),
        }
    }

    /// Reads and checks a slice length against [`MAX_SLICE_BYTES`] before
    /// any allocation, given the size in bytes of one element.
    pub fn read_slice_len(&mut self, element_size: usize) -> Result<usize, DecodeError> {
        let n = self.read_len()?;
        if n.saturating_mul(element_size as u64) > MAX_SLICE_BYTES {
            return Err(DecodeError::SliceTooLarge);
        }
        Ok(n as usize)
    }
}

/// A value that can write itself in canonical form.
pub trait Encode {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError>;

    /// Convenience entry point: encodes into a fresh byte buffer under the
    /// given flavor.
    fn encode_to_vec(&self, flavor: CodecFlavor) -> Result<Vec<u8>, EncodeError> {
        let mut enc = Encoder::new(Vec::new(), flavor);
        self.encode(&mut enc)?;
        Ok(enc.into_inner())
    }
}

/// A value that can read itself back out of canonical form.
pub trait Decode: Sized {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError>;

    /// Convenience entry point: decodes from a byte slice under the given
    /// flavor.
    fn decode_from_slice(bytes: &[u8], flavor: CodecFlavor) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes, flavor);
        Self::decode(&mut dec)
    }
}

macro_rules! impl_int {
    ($t:ty, $write:ident, $read:ident) => {
        impl Encode for $t {
            fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
                enc.writer.$write::<LittleEndian>(*self).map_err(EncodeError::from)
            }
        }
        impl Decode for $t {
            fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
                dec.reader.$read::<LittleEndian>().map_err(error::io_to_decode)
            }
        }
    };
}

impl_int!(u16, write_u16, read_u16);
impl_int!(u32, write_u32, read_u32);
impl_int!(u64, write_u64, read_u64);
impl_int!(i64, write_i64, read_i64);

impl Encode for u8 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        enc.write_byte(*self)
    }
}
impl Decode for u8 {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        dec.read_byte()
    }
}

impl Encode for bool {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        enc.write_byte(if *self { 1 } else { 0 })
    }
}
impl Decode for bool {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        match dec.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::Decode(format!("invalid bool byte {}", other))),
        }
    }
}

/// A 3-byte unsigned value, stored little-endian. Rounds out the
/// fixed-width integer primitives (`u16`/`u32`/`u64`) for wire fields that
/// are specified to occupy exactly 3 bytes rather than rounding up to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct U24(u32);

impl U24 {
    pub const MAX: u32 = 0xFF_FFFF;

    pub fn new(value: u32) -> Result<U24, EncodeError> {
        if value > Self::MAX {
            Err(EncodeError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "value does not fit in 3 bytes",
            )))
        } else {
            Ok(U24(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Encode for U24 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        let bytes = self.0.to_le_bytes();
        enc.write_bytes(&bytes[..3])
    }
}
impl Decode for U24 {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let bytes = dec.read_bytes(3)?;
        let value = bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16;
        Ok(U24(value))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        match self {
            Some(v) => {
                true.encode(enc)?;
                v.encode(enc)
            }
            None => false.encode(enc),
        }
    }
}
impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        if bool::decode(dec)? {
            Ok(Some(T::decode(dec)?))
        } else {
            Ok(None)
        }
    }
}

impl<A: Encode, B: Encode> Encode for (A, B) {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.encode(enc)?;
        self.1.encode(enc)
    }
}
impl<A: Decode, B: Decode> Decode for (A, B) {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok((A::decode(dec)?, B::decode(dec)?))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        enc.write_len(self.len() as u64)?;
        for item in self {
            item.encode(enc)?;
        }
        Ok(())
    }
}
impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        // Elements are variable-sized in the general case; a conservative
        // 1-byte-per-element floor still catches pathological counts.
        let n = dec.read_slice_len(1)?;
        let mut out = Vec::with_capacity(n.min(4096));
        for _ in 0..n {
            out.push(T::decode(dec)?);
        }
        Ok(out)
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        let bytes = self.as_bytes();
        enc.write_len(bytes.len() as u64)?;
        enc.write_bytes(bytes)
    }
}
impl Decode for String {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let n = dec.read_slice_len(1)?;
        let bytes = dec.read_bytes(n)?;
        String::from_utf8(bytes).map_err(|e| DecodeError::Decode(e.to_string()))
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        enc.write_bytes(self)
    }
}
impl<const N: usize> Decode for [u8; N] {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let bytes = dec.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }
}

/// A byte slice prefixed with a single raw length byte (0..=255), used for
/// the handful of fields the wire format caps well below the general
/// variable-length prefix's range.
pub struct TinySlice<T> {
    pub bytes: Vec<u8>,
    _marker: PhantomData<T>,
}

impl<T> TinySlice<T> {
    pub fn new(bytes: Vec<u8>) -> Result<Self, EncodeError> {
        if bytes.len() > u8::MAX as usize {
            return Err(EncodeError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "tiny slice exceeds 255 bytes",
            )));
        }
        Ok(TinySlice {
            bytes,
            _marker: PhantomData,
        })
    }
}

impl<T> Encode for TinySlice<T> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        enc.write_byte(self.bytes.len() as u8)?;
        enc.write_bytes(&self.bytes)
    }
}
impl<T> Decode for TinySlice<T> {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let len = dec.read_byte()? as usize;
        let bytes = dec.read_bytes(len)?;
        Ok(TinySlice {
            bytes,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(v: T, flavor: CodecFlavor) {
        let bytes = v.encode_to_vec(flavor).unwrap();
        let back = T::decode_from_slice(&bytes, flavor).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn primitives_roundtrip_both_flavors() {
        roundtrip(42u64, CodecFlavor::Compact);
        roundtrip(42u64, CodecFlavor::Legacy);
        roundtrip(true, CodecFlavor::Compact);
        roundtrip(vec![1u8, 2, 3], CodecFlavor::Compact);
        roundtrip(vec![1u8, 2, 3], CodecFlavor::Legacy);
        roundtrip(Some(7u32), CodecFlavor::Compact);
        roundtrip(None::<u32>, CodecFlavor::Compact);
        roundtrip("hello".to_string(), CodecFlavor::Compact);
    }

    #[test]
    fn u24_roundtrips_and_rejects_out_of_range() {
        roundtrip(U24::new(0).unwrap(), CodecFlavor::Compact);
        roundtrip(U24::new(1).unwrap(), CodecFlavor::Compact);
        roundtrip(U24::new(U24::MAX).unwrap(), CodecFlavor::Compact);
        assert!(U24::new(U24::MAX + 1).is_err());
    }

    #[test]
    fn truncated_input_is_unexpected_eof() {
        let bytes = 42u64.encode_to_vec(CodecFlavor::Compact).unwrap();
        let err = u64::decode_from_slice(&bytes[..4], CodecFlavor::Compact).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof));
    }

    #[test]
    fn oversized_slice_len_is_rejected() {
        let mut enc = Encoder::new(Vec::new(), CodecFlavor::Compact);
        enc.write_len(MAX_SLICE_BYTES + 1).unwrap();
        let bytes = enc.into_inner();
        let err = Vec::<u8>::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap_err();
        assert!(matches!(err, DecodeError::SliceTooLarge));
    }
}
