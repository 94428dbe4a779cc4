use crate::codec::{Decode, Encode};
use crate::conditions::UnlockCondition;
use crate::currency::Currency;
use crate::fulfillment::UnlockFulfillment;
use crate::hash::Hash;
use crate::specifier::{Specifier, BLOCK_STAKE_OUTPUT_ID, COIN_OUTPUT_ID};
use codec_derive::{Decode as DeriveDecode, Encode as DeriveEncode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The deterministic identity of an output: a hash over a kind specifier,
/// the parent transaction's ID, and the output's index within it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, DeriveEncode, DeriveDecode)]
pub struct OutputId(pub Hash);

impl OutputId {
    pub fn derive(kind: Specifier, parent_tx_id: Hash, index: u64) -> OutputId {
        OutputId(Hash::of_parts(&[
            kind.as_bytes(),
            parent_tx_id.as_bytes(),
            &index.to_le_bytes(),
        ]))
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}

macro_rules! output_type {
    ($name:ident, $specifier:expr) => {
        #[derive(Clone, PartialEq, Debug, Serialize, Deserialize, DeriveEncode, DeriveDecode)]
        pub struct $name {
            pub value: Currency,
            pub condition: UnlockCondition,
        }

        impl $name {
            pub fn id(&self, parent_tx_id: Hash, index: u64) -> OutputId {
                OutputId::derive($specifier, parent_tx_id, index)
            }
        }
    };
}

output_type!(CoinOutput, COIN_OUTPUT_ID);
output_type!(BlockStakeOutput, BLOCK_STAKE_OUTPUT_ID);

macro_rules! input_type {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Debug, Serialize, Deserialize, DeriveEncode, DeriveDecode)]
        pub struct $name {
            pub parent_id: OutputId,
            pub fulfillment: UnlockFulfillment,
        }
    };
}

input_type!(CoinInput);
input_type!(BlockStakeInput);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecFlavor;
    use crate::unlock_hash::{UnlockHash, UnlockHashType};

    #[test]
    fn coin_output_roundtrips() {
        let out = CoinOutput {
            value: Currency::from_u64(500),
            condition: UnlockCondition::UnlockHash(UnlockHash::new(
                UnlockHashType::PubKey,
                Hash::of_parts(&[b"addr"]),
            )),
        };
        let bytes = out.encode_to_vec(CodecFlavor::Compact).unwrap();
        let back = CoinOutput::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        assert_eq!(out, back);
    }

    #[test]
    fn output_id_is_deterministic_over_kind_parent_and_index() {
        let parent = Hash::of_parts(&[b"tx"]);
        let a = OutputId::derive(COIN_OUTPUT_ID, parent, 0);
        let b = OutputId::derive(COIN_OUTPUT_ID, parent, 0);
        let c = OutputId::derive(COIN_OUTPUT_ID, parent, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
