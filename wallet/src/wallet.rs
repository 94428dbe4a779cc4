use std::collections::HashMap;
use std::sync::Arc;

use chain_core::{BlockHeight, Currency, FulfillContext, OutputId, Transaction, UnlockHash};
use chrono::{DateTime, Utc};

use crate::builder::{RefundPolicy, TransactionBuilder};
use crate::config::Config;
use crate::error::WalletError;
use crate::handles::{ConsensusHandle, PoolHandle};
use crate::keystore::KeyStore;
use crate::seed::Seed;
use crate::storage::SeedFile;
use crate::tracking::Tracker;
use crate::{balances, locking};

/// The wallet subsystem: key management, output tracking, and a builder
/// factory, all gated behind a lock/unlock state.
pub struct Wallet {
    pub(crate) config: Config,
    pub(crate) keystore: KeyStore,
    pub(crate) tracker: Tracker,
    recently_spent: HashMap<OutputId, BlockHeight>,
    height: BlockHeight,
    time: DateTime<Utc>,
    consensus: Arc<dyn ConsensusHandle>,
    pool: Arc<dyn PoolHandle>,
}

impl Wallet {
    /// Constructs a wallet already unlocked with `primary`. Loading an
    /// encrypted seed file first goes through [`locking`] to recover the
    /// `Seed`, then this constructor.
    pub fn new(
        primary: Seed,
        config: Config,
        consensus: Arc<dyn ConsensusHandle>,
        pool: Arc<dyn PoolHandle>,
    ) -> Wallet {
        let keystore = KeyStore::new(primary, config.lookahead_window, config.rescan_threshold);
        Wallet {
            height: consensus.height(),
            time: consensus.time(),
            config,
            keystore,
            tracker: Tracker::default(),
            recently_spent: HashMap::new(),
            consensus,
            pool,
        }
    }

    pub fn from_seed_file(
        file: &SeedFile,
        unlock_key: Option<&[u8; 32]>,
        config: Config,
        consensus: Arc<dyn ConsensusHandle>,
        pool: Arc<dyn PoolHandle>,
    ) -> Result<Wallet, WalletError> {
        let seed = locking::recover_seed(file, unlock_key)?;
        Ok(Self::new(seed, config, consensus, pool))
    }

    pub fn tip_height(&self) -> BlockHeight {
        self.height
    }

    pub fn tip_time(&self) -> DateTime<Utc> {
        self.time
    }

    fn ctx(&self) -> FulfillContext {
        FulfillContext::new(self.height, self.time)
    }

    pub fn generate_address(&mut self) -> UnlockHash {
        self.keystore.generate_address()
    }

    pub fn apply_consensus_change(&mut self, cc: &chain_core::ConsensusChange) {
        self.tracker.apply_consensus_change(cc, &self.keystore);
        if let Some(last) = cc.applied_blocks.last() {
            self.height = last.height();
        }
        self.time = self.consensus.time();
        self.recently_spent.retain(|_, h| {
            self.height.0.saturating_sub(h.0) < self.config.respend_timeout
        });
    }

    pub fn receive_updated_unconfirmed(&mut self, txns: Vec<Transaction>) {
        self.tracker.receive_updated_unconfirmed(txns);
    }

    pub(crate) fn is_recently_spent(&self, id: &OutputId, height: BlockHeight) -> bool {
        match self.recently_spent.get(id) {
            Some(marked_at) => height.0.saturating_sub(marked_at.0) < self.config.respend_timeout,
            None => false,
        }
    }

    pub(crate) fn mark_recently_spent(&mut self, id: OutputId, height: BlockHeight) {
        self.recently_spent.insert(id, height);
    }

    pub(crate) fn clear_recently_spent(&mut self, id: &OutputId) {
        self.recently_spent.remove(id);
    }

    pub fn confirmed_balance(&self) -> Currency {
        balances::confirmed_balance(&self.tracker, &self.ctx())
    }

    pub fn confirmed_locked_balance(&self) -> Currency {
        balances::confirmed_locked_balance(&self.tracker, &self.ctx())
    }

    pub fn unconfirmed_balance(&self) -> (Currency, Currency) {
        balances::unconfirmed_balance(&self.tracker, &self.keystore)
    }

    pub fn multisig_wallets(&self) -> Vec<balances::MultisigWalletSummary> {
        balances::multisig_wallets(&self.tracker)
    }

    pub fn new_transaction(&mut self) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self)
    }

    /// Builds, funds, fees, signs, and submits a transaction paying
    /// `coin_outs`/`bs_outs`. At least one output is required.
    pub fn send_outputs(
        &mut self,
        coin_outs: Vec<chain_core::CoinOutput>,
        bs_outs: Vec<chain_core::BlockStakeOutput>,
        data: Vec<u8>,
        refund: Option<UnlockHash>,
        reuse: bool,
        miner_fee: Currency,
    ) -> Result<Transaction, WalletError> {
        if coin_outs.is_empty() && bs_outs.is_empty() {
            return Err(WalletError::NilOutputs);
        }
        let coin_total: Currency = coin_outs.iter().map(|o| o.value.clone()).sum();
        let bs_total: Currency = bs_outs.iter().map(|o| o.value.clone()).sum();

        let refund_policy = match refund {
            Some(uh) => RefundPolicy::ToAddress(uh),
            None if reuse => RefundPolicy::ReuseInputAddress,
            None => RefundPolicy::NewAddress,
        };

        let mut builder = self.new_transaction();
        if !coin_total.is_zero() || !miner_fee.is_zero() {
            builder.fund_coins(coin_total.clone() + miner_fee.clone(), refund_policy)?;
        }
        if !bs_total.is_zero() {
            builder.fund_block_stakes(bs_total, RefundPolicy::NewAddress)?;
        }
        for out in coin_outs {
            builder.add_coin_output(out);
        }
        for out in bs_outs {
            builder.add_block_stake_output(out);
        }
        builder.set_arbitrary_data(data)?;
        builder.add_miner_fee(miner_fee);
        let tx = builder.sign()?;
        self.pool
            .submit(vec![tx.clone()])
            .map_err(WalletError::Pool)?;
        Ok(tx)
    }

    /// Builds a transaction whose inputs reference specific on-chain
    /// outputs. Verifies coin_inputs - coin_outputs == configured fee and
    /// block_stake_inputs == block_stake_outputs (stakes carry no fee).
    pub fn create_raw_transaction(
        &mut self,
        coin_ids: Vec<OutputId>,
        bs_ids: Vec<OutputId>,
        coin_outs: Vec<chain_core::CoinOutput>,
        bs_outs: Vec<chain_core::BlockStakeOutput>,
        data: Vec<u8>,
    ) -> Result<Transaction, WalletError> {
        let coin_in_total: Currency = coin_ids
            .iter()
            .filter_map(|id| self.consensus.get_coin_output(id))
            .map(|o| o.value)
            .sum();
        let bs_in_total: Currency = bs_ids
            .iter()
            .filter_map(|id| self.consensus.get_block_stake_output(id))
            .map(|o| o.value)
            .sum();
        let coin_out_total: Currency = coin_outs.iter().map(|o| o.value.clone()).sum();
        let bs_out_total: Currency = bs_outs.iter().map(|o| o.value.clone()).sum();

        let actual_fee = coin_in_total
            .checked_sub(&coin_out_total)
            .ok_or(WalletError::FeeMismatch)?;
        if actual_fee != Currency::from_u64(self.config.transfer_fee) {
            return Err(WalletError::FeeMismatch);
        }
        if bs_in_total != bs_out_total {
            return Err(WalletError::FeeMismatch);
        }

        let mut builder = self.new_transaction();
        for id in coin_ids {
            builder.add_coin_input(chain_core::CoinInput {
                parent_id: id,
                fulfillment: chain_core::UnlockFulfillment::Nil,
            });
        }
        for id in bs_ids {
            builder.add_block_stake_input(chain_core::BlockStakeInput {
                parent_id: id,
                fulfillment: chain_core::UnlockFulfillment::Nil,
            });
        }
        for out in coin_outs {
            builder.add_coin_output(out);
        }
        for out in bs_outs {
            builder.add_block_stake_output(out);
        }
        builder.set_arbitrary_data(data)?;
        builder.add_miner_fee(Currency::from_u64(self.config.transfer_fee));
        Ok(builder.transaction().clone())
    }

    /// Registers `tx` with the builder machinery, best-effort-signs every
    /// input it can, and returns the (possibly partially signed) result.
    pub fn greedy_sign(&mut self, tx: Transaction) -> Result<Transaction, WalletError> {
        let consensus = Arc::clone(&self.consensus);
        let mut builder = self.new_transaction();
        builder.set_version(tx.version);
        builder.set_extension(tx.extension);
        for input in tx.coin_inputs {
            builder.add_coin_input(input);
        }
        for input in tx.block_stake_inputs {
            builder.add_block_stake_input(input);
        }
        for out in tx.coin_outputs {
            builder.add_coin_output(out);
        }
        for out in tx.block_stake_outputs {
            builder.add_block_stake_output(out);
        }
        builder.set_arbitrary_data(tx.arbitrary_data)?;
        for fee in tx.miner_fees {
            builder.add_miner_fee(fee);
        }
        builder.sign_all_possible(consensus.as_ref())
    }

    pub fn is_known(&self, uh: &UnlockHash) -> bool {
        self.keystore.is_known(uh)
    }
}
