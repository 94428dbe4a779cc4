//! `proptest::Arbitrary`-style strategies for the core value types, used
//! by the codec round-trip and length-prefix monotonicity properties.
//! Gated behind `proptest-impl`, matching the teacher crate's gate on its
//! own arbitrary implementations.

use crate::currency::Currency;
use crate::hash::Hash;
use crate::height::BlockHeight;
use crate::unlock_hash::{UnlockHash, UnlockHashType};
use proptest::prelude::*;

pub fn any_hash() -> impl Strategy<Value = Hash> {
    proptest::array::uniform32(any::<u8>()).prop_map(Hash)
}

pub fn any_currency() -> impl Strategy<Value = Currency> {
    any::<u64>().prop_map(Currency::from_u64)
}

pub fn any_block_height() -> impl Strategy<Value = BlockHeight> {
    any::<u64>().prop_map(BlockHeight)
}

pub fn any_unlock_hash_type() -> impl Strategy<Value = UnlockHashType> {
    prop_oneof![
        Just(UnlockHashType::Nil),
        Just(UnlockHashType::PubKey),
        Just(UnlockHashType::MultiSig),
        Just(UnlockHashType::TimeLock),
    ]
}

pub fn any_unlock_hash() -> impl Strategy<Value = UnlockHash> {
    (any_unlock_hash_type(), any_hash()).prop_map(|(kind, digest)| UnlockHash::new(kind, digest))
}
