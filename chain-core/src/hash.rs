use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// A fixed 32-byte digest produced by the hash primitive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const LEN: usize = 32;

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hashes `parts` end to end with the blake2b-256 primitive.
    pub fn of_parts(parts: &[&[u8]]) -> Hash {
        let mut params = blake2b_simd::Params::new();
        params.hash_length(32);
        let mut state = params.to_state();
        for part in parts {
            state.update(part);
        }
        let digest = state.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(digest.as_bytes());
        Hash(bytes)
    }
}

impl Encode for Hash {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.encode(enc)
    }
}

impl Decode for Hash {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok(Hash(<[u8; 32]>::decode(dec)?))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let mut out = [0u8; 32];
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        out.copy_from_slice(&bytes);
        Ok(Hash(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;

    #[test]
    fn hash_roundtrips_through_codec() {
        let h = Hash::of_parts(&[b"abc"]);
        let bytes = h.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = Hash::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(h, back);
    }

    #[test]
    fn display_and_from_str_roundtrip() {
        let h = Hash::of_parts(&[b"xyz"]);
        let s = h.to_string();
        let back: Hash = s.parse().unwrap();
        assert_eq!(h, back);
    }
}
