//! Canonical data model for the node core: the binary codec, the unlock
//! condition/fulfillment system, and the transaction/block shapes every
//! other crate in the workspace builds on.

// `codec-derive`'s generated impls reference `chain_core::codec::...`
// unconditionally, which only resolves from outside this crate unless it
// is also visible to itself under its own external name.
extern crate self as chain_core;

pub mod block;
pub mod codec;
pub mod conditions;
pub mod consensus_change;
pub mod context;
pub mod currency;
pub mod fulfillment;
pub mod hash;
pub mod height;
pub mod keys;
pub mod outputs;
pub mod specifier;
pub mod transaction;
pub mod unlock_hash;

pub use block::{Block, BlockHeader, BlockId};
pub use codec::{CodecFlavor, Decode, DecodeError, Decoder, Encode, EncodeError, Encoder, U24};
pub use conditions::{ConditionError, LockTime, UnlockCondition};
pub use consensus_change::{BlockStakeOutputDiff, CoinOutputDiff, ConsensusChange, ConsensusChangeId, DiffDirection};
pub use context::FulfillContext;
pub use currency::Currency;
pub use fulfillment::UnlockFulfillment;
pub use hash::Hash;
pub use height::BlockHeight;
pub use outputs::{BlockStakeInput, BlockStakeOutput, CoinInput, CoinOutput, OutputId};
pub use specifier::Specifier;
pub use transaction::{Extension, Transaction, TxVersion};
pub use unlock_hash::{UnlockHash, UnlockHashType};

#[cfg(feature = "proptest-impl")]
pub mod arbitrary;
