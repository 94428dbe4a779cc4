use chain_core::{CodecFlavor, Decode, Encode, Hash, Transaction};

use crate::error::PoolError;

/// Identifies a transaction set by the hash of its canonical encoding.
/// Two sets with the same transactions in the same order collide on
/// purpose: re-submitting byte-identical content should be recognized as
/// a duplicate rather than admitted twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(pub Hash);

impl SetId {
    pub fn derive(transactions: &[Transaction], flavor: CodecFlavor) -> Result<SetId, PoolError> {
        let bytes = transactions
            .to_vec()
            .encode_to_vec(flavor)
            .map_err(|e| PoolError::Conflict(Box::new(e)))?;
        Ok(SetId(Hash::of_parts(&[&bytes])))
    }
}

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A batch of transactions admitted as a unit. Sets are atomic: either all
/// of their transactions made it into the pool, or none did.
#[derive(Clone, Debug)]
pub struct TransactionSet {
    pub id: SetId,
    pub transactions: Vec<Transaction>,
    pub encoded_size: usize,
}

impl TransactionSet {
    pub fn transaction_ids(&self) -> Vec<Hash> {
        self.transactions.iter().map(|t| t.id()).collect()
    }
}

pub fn decode_transaction_set(bytes: &[u8], flavor: CodecFlavor) -> Result<Vec<Transaction>, PoolError> {
    Vec::<Transaction>::decode_from_slice(bytes, flavor).map_err(|e| PoolError::Conflict(Box::new(e)))
}

/// Narrates where a set sits in its lifecycle; the pool itself only keeps
/// sets that are currently `Admitted` or `Rebroadcast`-eligible, so this
/// enum exists for structured logging rather than as stored state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetStatus {
    Proposed,
    Admitted,
    Rebroadcast,
    Confirmed,
    EvictedOnReorg,
    EvictedOnConflict,
}
