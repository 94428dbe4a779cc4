use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use std::fmt;
use std::io::{Read, Write};

/// A fixed 16-byte domain-separation tag mixed into hashes so that values
/// of different kinds never collide even if their remaining fields happen
/// to encode identically.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specifier(pub [u8; 16]);

impl Specifier {
    /// Builds a specifier from an ASCII tag, right-padding with zero bytes.
    /// Panics if `tag` is longer than 16 bytes; specifiers are fixed
    /// compile-time constants, never user input.
    pub const fn from_ascii(tag: &'static str) -> Specifier {
        let bytes = tag.as_bytes();
        assert!(bytes.len() <= 16, "specifier tag too long");
        let mut out = [0u8; 16];
        let mut i = 0;
        while i < bytes.len() {
            out[i] = bytes[i];
            i += 1;
        }
        Specifier(out)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

pub const COIN_OUTPUT_ID: Specifier = Specifier::from_ascii("coinoutput");
pub const BLOCK_STAKE_OUTPUT_ID: Specifier = Specifier::from_ascii("blockstakeoutput");
pub const UNLOCK_HASH_TYPE_STANDARD: Specifier = Specifier::from_ascii("unlockhash");
pub const SPEC_CC: Specifier = Specifier::from_ascii("coincreate");
pub const SPEC_MD: Specifier = Specifier::from_ascii("minterdef");
pub const SPEC_CD: Specifier = Specifier::from_ascii("coindestroy");

impl Encode for Specifier {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.encode(enc)
    }
}

impl Decode for Specifier {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok(Specifier(<[u8; 16]>::decode(dec)?))
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trimmed: String = self.0.iter().take_while(|b| **b != 0).map(|b| *b as char).collect();
        write!(f, "Specifier({:?})", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_tags_with_zeroes() {
        assert_eq!(&SPEC_CC.0[8..], &[0u8; 8]);
    }
}
