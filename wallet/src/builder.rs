use std::collections::HashSet;

use chain_core::{
    BlockStakeInput, BlockStakeOutput, CoinInput, CoinOutput, Currency, Extension, FulfillContext,
    OutputId, Transaction, UnlockCondition, UnlockFulfillment, UnlockHash,
};

use crate::config::TRANSFER_VERSION;
use crate::error::WalletError;
use crate::handles::ConsensusHandle;
use crate::wallet::Wallet;

/// Where a funding overage is returned.
pub enum RefundPolicy {
    ToAddress(UnlockHash),
    ReuseInputAddress,
    NewAddress,
}

/// Assembles one transaction at a time. Borrows the wallet mutably for its
/// whole lifetime, so only one builder can be in flight; `drop()` (or
/// letting the builder fall out of scope) releases every output it
/// tentatively marked spent.
pub struct TransactionBuilder<'w> {
    wallet: &'w mut Wallet,
    tx: Transaction,
    signed: bool,
    marked: HashSet<OutputId>,
    released: bool,
}

impl<'w> TransactionBuilder<'w> {
    pub(crate) fn new(wallet: &'w mut Wallet) -> TransactionBuilder<'w> {
        TransactionBuilder {
            wallet,
            tx: Transaction {
                version: TRANSFER_VERSION,
                coin_inputs: vec![],
                coin_outputs: vec![],
                block_stake_inputs: vec![],
                block_stake_outputs: vec![],
                miner_fees: vec![],
                arbitrary_data: vec![],
                extension: None,
            },
            signed: false,
            marked: HashSet::new(),
            released: false,
        }
    }

    fn current_height(&self) -> chain_core::BlockHeight {
        self.wallet.tip_height()
    }

    /// Collects fulfillable owned outputs in value-descending order,
    /// skipping anything marked spent within the respend timeout, until
    /// their sum covers `amount`. Any overage becomes a refund output.
    pub fn fund_coins(&mut self, amount: Currency, refund: RefundPolicy) -> Result<(), WalletError> {
        let ctx = FulfillContext::new(self.current_height(), self.wallet.tip_time());
        let mut candidates: Vec<(OutputId, CoinOutput)> = self
            .wallet
            .tracker
            .coin_outputs
            .values()
            .filter(|o| o.relevance == crate::tracking::Relevance::Wallet)
            .filter(|o| o.output.condition.fulfillable(&ctx))
            .map(|o| (o.id, o.output.clone()))
            .collect();
        candidates.sort_by(|a, b| b.1.value.cmp(&a.1.value));

        let mut sum = Currency::zero();
        let mut chosen = Vec::new();
        let mut any_recently_respent = false;
        for (id, output) in candidates {
            if sum >= amount {
                break;
            }
            if self.wallet.is_recently_spent(&id, self.current_height()) {
                any_recently_respent = true;
                continue;
            }
            sum += output.value.clone();
            chosen.push((id, output));
        }

        if sum < amount {
            if any_recently_respent {
                return Err(WalletError::IncompleteTransactions);
            }
            return Err(WalletError::LowBalance);
        }

        let mut reuse_address = None;
        for (id, output) in &chosen {
            reuse_address = Some(output.condition.unlock_hash());
            self.tx.coin_inputs.push(CoinInput {
                parent_id: *id,
                fulfillment: UnlockFulfillment::Nil,
            });
            self.wallet.mark_recently_spent(*id, self.current_height());
            self.marked.insert(*id);
        }

        if let Some(overage) = sum.checked_sub(&amount) {
            if !overage.is_zero() {
                let refund_address = match refund {
                    RefundPolicy::ToAddress(uh) => uh,
                    RefundPolicy::ReuseInputAddress => reuse_address.ok_or(WalletError::LowBalance)?,
                    RefundPolicy::NewAddress => self.wallet.keystore.generate_address(),
                };
                self.tx.coin_outputs.push(CoinOutput {
                    value: overage,
                    condition: UnlockCondition::UnlockHash(refund_address),
                });
            }
        }
        Ok(())
    }

    pub fn fund_block_stakes(&mut self, amount: Currency, refund: RefundPolicy) -> Result<(), WalletError> {
        let ctx = FulfillContext::new(self.current_height(), self.wallet.tip_time());
        let mut candidates: Vec<(OutputId, BlockStakeOutput)> = self
            .wallet
            .tracker
            .block_stake_outputs
            .values()
            .filter(|o| o.relevance == crate::tracking::Relevance::Wallet)
            .filter(|o| o.output.condition.fulfillable(&ctx))
            .map(|o| (o.id, o.output.clone()))
            .collect();
        candidates.sort_by(|a, b| b.1.value.cmp(&a.1.value));

        let mut sum = Currency::zero();
        let mut chosen = Vec::new();
        let mut any_recently_respent = false;
        for (id, output) in candidates {
            if sum >= amount {
                break;
            }
            if self.wallet.is_recently_spent(&id, self.current_height()) {
                any_recently_respent = true;
                continue;
            }
            sum += output.value.clone();
            chosen.push((id, output));
        }
        if sum < amount {
            if any_recently_respent {
                return Err(WalletError::IncompleteTransactions);
            }
            return Err(WalletError::LowBalance);
        }

        let mut reuse_address = None;
        for (id, output) in &chosen {
            reuse_address = Some(output.condition.unlock_hash());
            self.tx.block_stake_inputs.push(BlockStakeInput {
                parent_id: *id,
                fulfillment: UnlockFulfillment::Nil,
            });
            self.wallet.mark_recently_spent(*id, self.current_height());
            self.marked.insert(*id);
        }
        if let Some(overage) = sum.checked_sub(&amount) {
            if !overage.is_zero() {
                let refund_address = match refund {
                    RefundPolicy::ToAddress(uh) => uh,
                    RefundPolicy::ReuseInputAddress => reuse_address.ok_or(WalletError::LowBalance)?,
                    RefundPolicy::NewAddress => self.wallet.keystore.generate_address(),
                };
                self.tx.block_stake_outputs.push(BlockStakeOutput {
                    value: overage,
                    condition: UnlockCondition::UnlockHash(refund_address),
                });
            }
        }
        Ok(())
    }

    pub fn add_coin_output(&mut self, output: CoinOutput) {
        self.tx.coin_outputs.push(output);
    }

    pub fn add_coin_input(&mut self, input: CoinInput) {
        self.tx.coin_inputs.push(input);
    }

    pub fn add_block_stake_output(&mut self, output: BlockStakeOutput) {
        self.tx.block_stake_outputs.push(output);
    }

    /// Attaches an already-constructed block-stake input verbatim, without
    /// the ownership check `spend_block_stake` makes — for inputs copied
    /// from a caller-supplied transaction or resolved externally (e.g.
    /// through the consensus collaborator), not selected from the wallet's
    /// own tracker.
    pub fn add_block_stake_input(&mut self, input: BlockStakeInput) {
        self.tx.block_stake_inputs.push(input);
    }

    pub fn set_version(&mut self, version: u64) {
        self.tx.version = version;
    }

    pub fn set_extension(&mut self, extension: Option<Extension>) {
        self.tx.extension = extension;
    }

    pub fn add_miner_fee(&mut self, fee: Currency) {
        self.tx.miner_fees.push(fee);
    }

    pub fn set_arbitrary_data(&mut self, data: Vec<u8>) -> Result<(), WalletError> {
        if data.len() > self.wallet.config.arbitrary_data_limit {
            return Err(WalletError::ArbitraryDataTooLarge);
        }
        self.tx.arbitrary_data = data;
        Ok(())
    }

    /// Attaches a specific unspent block-stake output by ID, outside the
    /// value-descending selection `fund_block_stakes` does.
    pub fn spend_block_stake(&mut self, id: OutputId) -> Result<(), WalletError> {
        if !self.wallet.tracker.block_stake_outputs.contains_key(&id) {
            return Err(WalletError::UnknownAddress);
        }
        self.tx.block_stake_inputs.push(BlockStakeInput {
            parent_id: id,
            fulfillment: UnlockFulfillment::Nil,
        });
        self.wallet.mark_recently_spent(id, self.current_height());
        self.marked.insert(id);
        Ok(())
    }

    /// Releases every output this builder tentatively marked spent.
    pub fn drop_builder(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for id in self.marked.drain() {
            self.wallet.clear_recently_spent(&id);
        }
        self.released = true;
    }

    /// Signs every input this builder added, plus the extension's mint
    /// fulfillment when the transaction carries one.
    pub fn sign(&mut self) -> Result<Transaction, WalletError> {
        if self.signed {
            return Err(WalletError::AlreadySigned);
        }
        let digest = self.tx.id();

        for input in &mut self.tx.coin_inputs {
            let Some(owned) = self.wallet.tracker.coin_outputs.get(&input.parent_id) else {
                continue;
            };
            if let Some(fulfillment) = sign_condition(&owned.output.condition, &digest, &self.wallet.keystore) {
                input.fulfillment = fulfillment;
            }
        }
        for input in &mut self.tx.block_stake_inputs {
            let Some(owned) = self.wallet.tracker.block_stake_outputs.get(&input.parent_id) else {
                continue;
            };
            if let Some(fulfillment) = sign_condition(&owned.output.condition, &digest, &self.wallet.keystore) {
                input.fulfillment = fulfillment;
            }
        }

        self.signed = true;
        Ok(self.tx.clone())
    }

    /// Best-effort variant: resolves parent outputs through the consensus
    /// collaborator for inputs this builder did not itself add (e.g. from
    /// `create_raw_transaction`), and signs whichever ones map to a
    /// wallet-known key.
    pub fn sign_all_possible(&mut self, consensus: &dyn ConsensusHandle) -> Result<Transaction, WalletError> {
        if self.signed {
            return Err(WalletError::AlreadySigned);
        }
        let digest = self.tx.id();

        for input in &mut self.tx.coin_inputs {
            let condition = match self.wallet.tracker.coin_outputs.get(&input.parent_id) {
                Some(owned) => Some(owned.output.condition.clone()),
                None => consensus.get_coin_output(&input.parent_id).map(|o| o.condition),
            };
            if let Some(condition) = condition {
                if let Some(fulfillment) = sign_condition(&condition, &digest, &self.wallet.keystore) {
                    input.fulfillment = fulfillment;
                }
            }
        }
        for input in &mut self.tx.block_stake_inputs {
            let condition = match self.wallet.tracker.block_stake_outputs.get(&input.parent_id) {
                Some(owned) => Some(owned.output.condition.clone()),
                None => consensus.get_block_stake_output(&input.parent_id).map(|o| o.condition),
            };
            if let Some(condition) = condition {
                if let Some(fulfillment) = sign_condition(&condition, &digest, &self.wallet.keystore) {
                    input.fulfillment = fulfillment;
                }
            }
        }

        self.signed = true;
        Ok(self.tx.clone())
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }
}

impl<'w> Drop for TransactionBuilder<'w> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Dispatches signing per condition type, unwrapping a `TimeLock` to its
/// inner condition first. `MultiSig` signs with every owner key the
/// wallet happens to hold, which may be fewer than the threshold.
fn sign_condition(
    condition: &UnlockCondition,
    digest: &chain_core::Hash,
    keystore: &crate::keystore::KeyStore,
) -> Option<UnlockFulfillment> {
    match condition {
        UnlockCondition::Nil => Some(UnlockFulfillment::Nil),
        UnlockCondition::UnlockHash(uh) => {
            let pk = keystore.public_key(uh)?;
            let sig = keystore.sign(uh, digest)?;
            Some(UnlockFulfillment::single_signature(pk, sig))
        }
        UnlockCondition::MultiSig { owners, .. } => {
            let pairs: Vec<_> = owners
                .iter()
                .filter_map(|uh| {
                    let pk = keystore.public_key(uh)?;
                    let sig = keystore.sign(uh, digest)?;
                    Some((pk, sig))
                })
                .collect();
            if pairs.is_empty() {
                None
            } else {
                Some(UnlockFulfillment::MultiSignature { pairs })
            }
        }
        UnlockCondition::TimeLock { inner, .. } => sign_condition(inner, digest, keystore),
    }
}
