use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// A block height: unsigned and monotonic along the chain's canonical tip.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    pub const GENESIS: BlockHeight = BlockHeight(0);

    pub fn succ(self) -> BlockHeight {
        BlockHeight(self.0 + 1)
    }

    /// The big-endian 8-byte key under which this height is stored in the
    /// minting plugin's ordered bucket, so lexicographic byte order on the
    /// key matches numeric order on the height.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> BlockHeight {
        BlockHeight(u64::from_be_bytes(bytes))
    }
}

impl fmt::Debug for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHeight({})", self.0)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Encode for BlockHeight {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.0.encode(enc)
    }
}

impl Decode for BlockHeight {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok(BlockHeight(u64::decode(dec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn be_bytes_preserve_numeric_order() {
        let a = BlockHeight(99).to_be_bytes();
        let b = BlockHeight(100).to_be_bytes();
        assert!(a < b);
    }

    #[test]
    fn be_bytes_roundtrip() {
        let h = BlockHeight(123_456);
        assert_eq!(BlockHeight::from_be_bytes(h.to_be_bytes()), h);
    }
}
