use crate::hash::Hash;
use crate::height::BlockHeight;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};

/// Everything a condition or fulfillment needs to evaluate itself: the
/// height and time the evaluation is pinned to, the transaction the
/// fulfillment is embedded in (when available, so per-input checks such as
/// multisig ordering can see their sibling fields), and the digest a
/// signature inside the fulfillment is expected to commit to.
///
/// `signature_hash` is set by callers that know the controller-specific
/// signing digest (the minting transaction controllers, per their own
/// `TxSignatureHasher::signature_hash`); it is never derived from
/// `transaction` here, since at verification time the transaction already
/// carries the fulfillment being checked and hashing it would make the
/// digest depend on the very signature it authenticates.
#[derive(Clone, Debug)]
pub struct FulfillContext<'a> {
    pub height: BlockHeight,
    pub time: DateTime<Utc>,
    pub transaction: Option<&'a Transaction>,
    pub signature_hash: Option<Hash>,
}

impl<'a> FulfillContext<'a> {
    pub fn new(height: BlockHeight, time: DateTime<Utc>) -> FulfillContext<'a> {
        FulfillContext {
            height,
            time,
            transaction: None,
            signature_hash: None,
        }
    }

    pub fn with_transaction(mut self, tx: &'a Transaction) -> FulfillContext<'a> {
        self.transaction = Some(tx);
        self
    }

    pub fn with_signature_hash(mut self, digest: Hash) -> FulfillContext<'a> {
        self.signature_hash = Some(digest);
        self
    }
}
