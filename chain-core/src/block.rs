use crate::codec::{Decode, DecodeError, Encode, EncodeError, Decoder, Encoder};
use crate::hash::Hash;
use crate::height::BlockHeight;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use codec_derive::{Decode as DeriveDecode, Encode as DeriveEncode};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// The hash of a block's header; identifies the block chain-wide.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveEncode, DeriveDecode)]
pub struct BlockId(pub Hash);

impl std::fmt::Debug for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BlockHeader {
    pub parent_id: BlockId,
    pub timestamp: DateTime<Utc>,
    pub height: BlockHeight,
}

impl Encode for BlockHeader {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.parent_id.encode(enc)?;
        self.timestamp.timestamp().encode(enc)?;
        self.height.encode(enc)
    }
}
impl Decode for BlockHeader {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        let parent_id = BlockId::decode(dec)?;
        let ts = i64::decode(dec)?;
        let timestamp = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| DecodeError::Decode("invalid block timestamp".into()))?;
        let height = BlockHeight::decode(dec)?;
        Ok(BlockHeader {
            parent_id,
            timestamp,
            height,
        })
    }
}

impl BlockHeader {
    pub fn id(&self) -> BlockId {
        let bytes = self
            .encode_to_vec(crate::codec::CodecFlavor::Compact)
            .expect("in-memory encode cannot fail");
        BlockId(Hash::of_parts(&[&bytes]))
    }
}

/// An ordered sequence of transactions plus the header that identifies the
/// block and fixes its position in the chain.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn id(&self) -> BlockId {
        self.header.id()
    }

    pub fn height(&self) -> BlockHeight {
        self.header.height
    }
}

impl Encode for Block {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) -> Result<(), EncodeError> {
        self.header.encode(enc)?;
        self.transactions.encode(enc)
    }
}
impl Decode for Block {
    fn decode<R: Read>(dec: &mut Decoder<R>) -> Result<Self, DecodeError> {
        Ok(Block {
            header: BlockHeader::decode(dec)?,
            transactions: Vec::decode(dec)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;

    #[test]
    fn block_roundtrips() {
        let b = Block {
            header: BlockHeader {
                parent_id: BlockId(Hash([0u8; 32])),
                timestamp: Utc::now(),
                height: BlockHeight(1),
            },
            transactions: vec![],
        };
        let bytes = b.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = Block::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(b.header.height, back.header.height);
        assert_eq!(b.header.parent_id, back.header.parent_id);
    }
}
