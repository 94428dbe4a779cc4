use crate::error::TxError;
use chain_core::{Hash, Transaction, UnlockCondition};
use std::io::{Read, Write};

/// Everything a controller needs to validate a transaction against the
/// chain state at the height it is being considered for.
pub struct ValidationContext<'a> {
    pub height: chain_core::BlockHeight,
    pub time: chrono::DateTime<chrono::Utc>,
    pub active_mint_condition: &'a UnlockCondition,
}

/// A version-keyed implementation of one minting transaction family.
/// Controllers compose by delegation: the registry looks one up by
/// `Transaction::version` and calls through the capability traits below,
/// never by inheritance.
pub trait TxController {
    fn version(&self) -> u64;

    /// Re-encodes `tx`'s body under the controller's codec flavor, for
    /// callers that need the canonical wire bytes directly (persistence,
    /// relay).
    fn encode_tx_data<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError>;

    fn decode_tx_data<R: Read>(&self, r: &mut R) -> Result<Transaction, TxError>;

    fn json_encode(&self, tx: &Transaction) -> Result<String, TxError>;
    fn json_decode(&self, s: &str) -> Result<Transaction, TxError>;

    /// Validates `tx` against the rules for this controller's family at
    /// `ctx`. Does not check signatures; that is `TxSignatureHasher`'s and
    /// the unlock model's job, invoked separately by callers that already
    /// hold a `FulfillContext`.
    fn validate(&self, tx: &Transaction, ctx: &ValidationContext) -> Result<(), TxError>;
}

/// Computes the digest a signer signs over for a given transaction.
pub trait TxSignatureHasher {
    /// `extra` is caller-supplied context folded into the hash ahead of
    /// the controller's own fields — e.g. a spent output's parent ID when
    /// hashing per-input, or empty when the whole transaction signs as one
    /// unit.
    fn signature_hash(&self, tx: &Transaction, extra: &[u8]) -> Result<Hash, TxError>;
}

/// Encodes the subset of a transaction's bytes that feed its ID, as
/// opposed to the full wire encoding (which also carries fulfillments).
pub trait TxIDEncoder {
    fn encode_tx_id_input<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError>;

    fn tx_id(&self, tx: &Transaction) -> Result<Hash, TxError> {
        let mut buf = Vec::new();
        self.encode_tx_id_input(&mut buf, tx)?;
        Ok(Hash::of_parts(&[&buf]))
    }
}

/// Controllers whose extension carries a mint fulfillment that must be
/// signed by the party authorized under the active mint condition.
pub trait TxExtensionSigner {
    fn sign_extension<F>(&self, tx: &mut Transaction, sign_fn: F) -> Result<(), TxError>
    where
        F: FnOnce(&Hash) -> chain_core::UnlockFulfillment;
}

/// Minter-definition additionally surfaces its replacement condition for
/// higher-level systems (e.g. the minting plugin's apply step) without
/// those systems needing to know the extension's internal shape.
pub trait CommonExtensionData {
    fn common_extension_data(&self, tx: &Transaction) -> Result<UnlockCondition, TxError>;
}
