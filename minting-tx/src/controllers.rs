use crate::config::Config;
use crate::error::TxError;
use crate::traits::{CommonExtensionData, TxController, TxExtensionSigner, TxIDEncoder, TxSignatureHasher, ValidationContext};
use chain_core::specifier::{SPEC_CC, SPEC_CD, SPEC_MD};
use chain_core::{
    CodecFlavor, Decode, Decoder, Encode, Encoder, Extension, Hash, Transaction, UnlockCondition,
    UnlockFulfillment,
};
use std::io::{Read, Write};

fn hash_encoded(
    flavor: CodecFlavor,
    build: impl FnOnce(&mut Encoder<Vec<u8>>) -> Result<(), chain_core::EncodeError>,
) -> Result<Hash, TxError> {
    let mut enc = Encoder::new(Vec::new(), flavor);
    build(&mut enc)?;
    Ok(Hash::of_parts(&[&enc.into_inner()]))
}

fn check_no_coin_or_block_stake_fields(tx: &Transaction) -> Result<(), TxError> {
    if !tx.coin_inputs.is_empty()
        || !tx.block_stake_inputs.is_empty()
        || !tx.block_stake_outputs.is_empty()
    {
        Err(TxError::UnexpectedInputsOrOutputs)
    } else {
        Ok(())
    }
}

fn check_outputs_standard_and_nonzero(
    outputs: &[chain_core::CoinOutput],
    ctx: &ValidationContext,
) -> Result<(), TxError> {
    let fulfill_ctx = chain_core::FulfillContext::new(ctx.height, ctx.time);
    for out in outputs {
        if out.value.is_zero() {
            return Err(TxError::ZeroOutput);
        }
        out.condition
            .is_standard(&fulfill_ctx)
            .map_err(|e| TxError::NonStandardCondition(e.to_string()))?;
    }
    Ok(())
}

fn check_fees(fees: &[chain_core::Currency], minimum: u64) -> Result<(), TxError> {
    for fee in fees {
        if *fee < chain_core::Currency::from_u64(minimum) {
            return Err(TxError::FeeTooSmall);
        }
    }
    Ok(())
}

fn check_arbitrary_data(data: &[u8], limit: usize) -> Result<(), TxError> {
    if data.len() > limit {
        Err(TxError::ArbitraryDataTooLarge)
    } else {
        Ok(())
    }
}

/// Common read/write/json plumbing shared by the three minting
/// controllers, parameterized only by codec flavor and config.
struct Base {
    flavor: CodecFlavor,
    config: Config,
}

impl Base {
    fn encode<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        let mut enc = Encoder::new(w, self.flavor);
        tx.encode(&mut enc).map_err(TxError::from)
    }

    fn decode<R: Read>(&self, r: &mut R) -> Result<Transaction, TxError> {
        let mut dec = Decoder::new(r, self.flavor);
        Transaction::decode(&mut dec).map_err(TxError::from)
    }

    fn json_encode(&self, tx: &Transaction) -> Result<String, TxError> {
        serde_json::to_string(tx).map_err(|e| TxError::Json(e.to_string()))
    }

    fn json_decode(&self, s: &str) -> Result<Transaction, TxError> {
        serde_json::from_str(s).map_err(|e| TxError::Json(e.to_string()))
    }
}

fn mint_fulfillment_of(tx: &Transaction) -> Result<&UnlockFulfillment, TxError> {
    match &tx.extension {
        Some(Extension::CoinCreation { mint_fulfillment, .. }) => Ok(mint_fulfillment),
        Some(Extension::MinterDefinition { mint_fulfillment, .. }) => Ok(mint_fulfillment),
        _ => Err(TxError::MissingExtension),
    }
}

fn nonce_of(tx: &Transaction) -> Result<[u8; 8], TxError> {
    match &tx.extension {
        Some(Extension::CoinCreation { nonce, .. }) => Ok(*nonce),
        Some(Extension::MinterDefinition { nonce, .. }) => Ok(*nonce),
        _ => Err(TxError::MissingExtension),
    }
}

/// **Coin Creation**: mints new coins under authority of the active mint
/// condition. Carries no coin or block-stake inputs/outputs of its own —
/// its only effect is the `coin_outputs` it creates.
pub struct CoinCreationController {
    base: Base,
}

impl CoinCreationController {
    pub fn new(flavor: CodecFlavor, config: Config) -> CoinCreationController {
        CoinCreationController {
            base: Base { flavor, config },
        }
    }
}

impl TxController for CoinCreationController {
    fn version(&self) -> u64 {
        self.base.config.coin_creation_version
    }

    fn encode_tx_data<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        self.base.encode(w, tx)
    }
    fn decode_tx_data<R: Read>(&self, r: &mut R) -> Result<Transaction, TxError> {
        self.base.decode(r)
    }
    fn json_encode(&self, tx: &Transaction) -> Result<String, TxError> {
        self.base.json_encode(tx)
    }
    fn json_decode(&self, s: &str) -> Result<Transaction, TxError> {
        self.base.json_decode(s)
    }

    fn validate(&self, tx: &Transaction, ctx: &ValidationContext) -> Result<(), TxError> {
        check_no_coin_or_block_stake_fields(tx)?;
        let nonce = nonce_of(tx)?;
        if nonce == [0u8; 8] {
            return Err(TxError::NilNonce);
        }
        check_arbitrary_data(&tx.arbitrary_data, self.base.config.arbitrary_data_limit)?;
        check_fees(&tx.miner_fees, self.base.config.minimum_miner_fee)?;
        check_outputs_standard_and_nonzero(&tx.coin_outputs, ctx)?;

        let fulfillment = mint_fulfillment_of(tx)?;
        let digest = self.signature_hash(tx, &[])?;
        let fulfill_ctx = chain_core::FulfillContext::new(ctx.height, ctx.time)
            .with_transaction(tx)
            .with_signature_hash(digest);
        ctx.active_mint_condition
            .fulfill(fulfillment, &fulfill_ctx)
            .map_err(|e| TxError::ConditionUnfulfilled(e.to_string()))
    }
}

impl TxSignatureHasher for CoinCreationController {
    fn signature_hash(&self, tx: &Transaction, extra: &[u8]) -> Result<Hash, TxError> {
        let nonce = nonce_of(tx)?;
        let extra = extra.to_vec();
        hash_encoded(self.base.flavor, |enc| {
            tx.version.encode(enc)?;
            SPEC_CC.encode(enc)?;
            nonce.encode(enc)?;
            extra.encode(enc)?;
            tx.coin_outputs.encode(enc)?;
            tx.miner_fees.encode(enc)?;
            tx.arbitrary_data.encode(enc)
        })
    }
}

impl TxIDEncoder for CoinCreationController {
    fn encode_tx_id_input<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        let nonce = nonce_of(tx)?;
        let mut enc = Encoder::new(w, self.base.flavor);
        tx.version.encode(&mut enc).map_err(TxError::from)?;
        SPEC_CC.encode(&mut enc).map_err(TxError::from)?;
        nonce.encode(&mut enc).map_err(TxError::from)?;
        tx.coin_outputs.encode(&mut enc).map_err(TxError::from)?;
        tx.miner_fees.encode(&mut enc).map_err(TxError::from)?;
        tx.arbitrary_data.encode(&mut enc).map_err(TxError::from)
    }
}

impl TxExtensionSigner for CoinCreationController {
    fn sign_extension<F>(&self, tx: &mut Transaction, sign_fn: F) -> Result<(), TxError>
    where
        F: FnOnce(&Hash) -> UnlockFulfillment,
    {
        let digest = self.signature_hash(tx, &[])?;
        let nonce = nonce_of(tx)?;
        match &mut tx.extension {
            Some(Extension::CoinCreation { mint_fulfillment, .. }) => {
                *mint_fulfillment = sign_fn(&digest);
                let _ = nonce;
                Ok(())
            }
            _ => Err(TxError::MissingExtension),
        }
    }
}

/// **Minter Definition**: replaces the active mint condition. Like coin
/// creation, carries no coin or block-stake inputs/outputs; its one
/// effect is the replacement `mint_condition` in its extension.
pub struct MinterDefinitionController {
    base: Base,
}

impl MinterDefinitionController {
    pub fn new(flavor: CodecFlavor, config: Config) -> MinterDefinitionController {
        MinterDefinitionController {
            base: Base { flavor, config },
        }
    }
}

fn mint_condition_of(tx: &Transaction) -> Result<&UnlockCondition, TxError> {
    match &tx.extension {
        Some(Extension::MinterDefinition { mint_condition, .. }) => Ok(mint_condition),
        _ => Err(TxError::MissingExtension),
    }
}

impl TxController for MinterDefinitionController {
    fn version(&self) -> u64 {
        self.base.config.minter_definition_version
    }

    fn encode_tx_data<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        self.base.encode(w, tx)
    }
    fn decode_tx_data<R: Read>(&self, r: &mut R) -> Result<Transaction, TxError> {
        self.base.decode(r)
    }
    fn json_encode(&self, tx: &Transaction) -> Result<String, TxError> {
        self.base.json_encode(tx)
    }
    fn json_decode(&self, s: &str) -> Result<Transaction, TxError> {
        self.base.json_decode(s)
    }

    fn validate(&self, tx: &Transaction, ctx: &ValidationContext) -> Result<(), TxError> {
        check_no_coin_or_block_stake_fields(tx)?;
        if !tx.coin_outputs.is_empty() {
            return Err(TxError::UnexpectedInputsOrOutputs);
        }
        let nonce = nonce_of(tx)?;
        if nonce == [0u8; 8] {
            return Err(TxError::NilNonce);
        }
        check_arbitrary_data(&tx.arbitrary_data, self.base.config.arbitrary_data_limit)?;
        check_fees(&tx.miner_fees, self.base.config.minimum_miner_fee)?;

        let new_condition = mint_condition_of(tx)?;
        let digest = self.signature_hash(tx, &[])?;
        let fulfill_ctx = chain_core::FulfillContext::new(ctx.height, ctx.time)
            .with_transaction(tx)
            .with_signature_hash(digest);
        new_condition
            .is_standard(&fulfill_ctx)
            .map_err(|e| TxError::NonStandardMintCondition(e.to_string()))?;

        let fulfillment = mint_fulfillment_of(tx)?;
        ctx.active_mint_condition
            .fulfill(fulfillment, &fulfill_ctx)
            .map_err(|e| TxError::ConditionUnfulfilled(e.to_string()))
    }
}

impl TxSignatureHasher for MinterDefinitionController {
    fn signature_hash(&self, tx: &Transaction, extra: &[u8]) -> Result<Hash, TxError> {
        let nonce = nonce_of(tx)?;
        let mint_condition = mint_condition_of(tx)?;
        let extra = extra.to_vec();
        hash_encoded(self.base.flavor, |enc| {
            tx.version.encode(enc)?;
            SPEC_MD.encode(enc)?;
            nonce.encode(enc)?;
            extra.encode(enc)?;
            mint_condition.encode(enc)?;
            tx.miner_fees.encode(enc)?;
            tx.arbitrary_data.encode(enc)
        })
    }
}

impl TxIDEncoder for MinterDefinitionController {
    fn encode_tx_id_input<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        let nonce = nonce_of(tx)?;
        let mint_condition = mint_condition_of(tx)?;
        let mut enc = Encoder::new(w, self.base.flavor);
        tx.version.encode(&mut enc).map_err(TxError::from)?;
        SPEC_MD.encode(&mut enc).map_err(TxError::from)?;
        nonce.encode(&mut enc).map_err(TxError::from)?;
        mint_condition.encode(&mut enc).map_err(TxError::from)?;
        tx.miner_fees.encode(&mut enc).map_err(TxError::from)?;
        tx.arbitrary_data.encode(&mut enc).map_err(TxError::from)
    }
}

impl TxExtensionSigner for MinterDefinitionController {
    fn sign_extension<F>(&self, tx: &mut Transaction, sign_fn: F) -> Result<(), TxError>
    where
        F: FnOnce(&Hash) -> UnlockFulfillment,
    {
        let digest = self.signature_hash(tx, &[])?;
        match &mut tx.extension {
            Some(Extension::MinterDefinition { mint_fulfillment, .. }) => {
                *mint_fulfillment = sign_fn(&digest);
                Ok(())
            }
            _ => Err(TxError::MissingExtension),
        }
    }
}

impl CommonExtensionData for MinterDefinitionController {
    fn common_extension_data(&self, tx: &Transaction) -> Result<UnlockCondition, TxError> {
        mint_condition_of(tx).cloned()
    }
}

/// **Coin Destruction**: a plain coin transfer. Requires no extension;
/// forbids block-stake inputs/outputs.
pub struct CoinDestructionController {
    base: Base,
}

impl CoinDestructionController {
    pub fn new(flavor: CodecFlavor, config: Config) -> CoinDestructionController {
        CoinDestructionController {
            base: Base { flavor, config },
        }
    }
}

impl TxController for CoinDestructionController {
    fn version(&self) -> u64 {
        self.base.config.coin_destruction_version
    }

    fn encode_tx_data<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        self.base.encode(w, tx)
    }
    fn decode_tx_data<R: Read>(&self, r: &mut R) -> Result<Transaction, TxError> {
        self.base.decode(r)
    }
    fn json_encode(&self, tx: &Transaction) -> Result<String, TxError> {
        self.base.json_encode(tx)
    }
    fn json_decode(&self, s: &str) -> Result<Transaction, TxError> {
        self.base.json_decode(s)
    }

    fn validate(&self, tx: &Transaction, ctx: &ValidationContext) -> Result<(), TxError> {
        if !tx.block_stake_inputs.is_empty() || !tx.block_stake_outputs.is_empty() {
            return Err(TxError::UnexpectedInputsOrOutputs);
        }
        if tx.coin_inputs.is_empty() {
            return Err(TxError::NoCoinInputs);
        }
        if tx.miner_fees.is_empty() {
            return Err(TxError::NoMinerFees);
        }
        check_arbitrary_data(&tx.arbitrary_data, self.base.config.arbitrary_data_limit)?;
        check_fees(&tx.miner_fees, self.base.config.minimum_miner_fee)?;
        check_outputs_standard_and_nonzero(&tx.coin_outputs, ctx)
    }
}

impl TxSignatureHasher for CoinDestructionController {
    fn signature_hash(&self, tx: &Transaction, extra: &[u8]) -> Result<Hash, TxError> {
        let parent_ids: Vec<chain_core::OutputId> =
            tx.coin_inputs.iter().map(|i| i.parent_id).collect();
        let extra = extra.to_vec();
        hash_encoded(self.base.flavor, |enc| {
            tx.version.encode(enc)?;
            SPEC_CD.encode(enc)?;
            extra.encode(enc)?;
            parent_ids.encode(enc)?;
            tx.coin_outputs.encode(enc)?;
            tx.miner_fees.encode(enc)?;
            tx.arbitrary_data.encode(enc)
        })
    }
}

impl TxIDEncoder for CoinDestructionController {
    fn encode_tx_id_input<W: Write>(&self, w: &mut W, tx: &Transaction) -> Result<(), TxError> {
        let parent_ids: Vec<chain_core::OutputId> =
            tx.coin_inputs.iter().map(|i| i.parent_id).collect();
        let mut enc = Encoder::new(w, self.base.flavor);
        tx.version.encode(&mut enc).map_err(TxError::from)?;
        SPEC_CD.encode(&mut enc).map_err(TxError::from)?;
        parent_ids.encode(&mut enc).map_err(TxError::from)?;
        tx.coin_outputs.encode(&mut enc).map_err(TxError::from)?;
        tx.miner_fees.encode(&mut enc).map_err(TxError::from)?;
        tx.arbitrary_data.encode(&mut enc).map_err(TxError::from)
    }
}
