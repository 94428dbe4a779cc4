use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chain_core::{
    BlockHeight, BlockStakeOutput, CoinOutput, ConsensusChange, DiffDirection, OutputId,
    Transaction,
};
use chrono::{DateTime, Utc};
use minting_state::MintConditionStore;
use minting_tx::{ControllerRegistry, ValidationContext};

use txpool::BoxError as PoolBoxError;
use wallet::BoxError as WalletBoxError;

/// Everything the node keeps about the chain tip in memory: the height and
/// wall-clock time last observed, and an index of every currently unspent
/// output this process has seen through a `ConsensusChange`. Real peer
/// discovery, block validation, and block production live outside this
/// core and are expected to drive this struct through
/// `apply_consensus_change`.
pub struct ChainState {
    store: RwLock<MintConditionStore>,
    registry: ControllerRegistry,
    height: RwLock<BlockHeight>,
    time: RwLock<DateTime<Utc>>,
    coin_outputs: RwLock<HashMap<OutputId, CoinOutput>>,
    block_stake_outputs: RwLock<HashMap<OutputId, BlockStakeOutput>>,
}

impl ChainState {
    pub fn new(store: MintConditionStore, registry: ControllerRegistry) -> ChainState {
        ChainState {
            store: RwLock::new(store),
            registry,
            height: RwLock::new(BlockHeight::GENESIS),
            time: RwLock::new(Utc::now()),
            coin_outputs: RwLock::new(HashMap::new()),
            block_stake_outputs: RwLock::new(HashMap::new()),
        }
    }

    pub fn height(&self) -> BlockHeight {
        *self.height.read().expect("chain state lock poisoned")
    }

    pub fn time(&self) -> DateTime<Utc> {
        *self.time.read().expect("chain state lock poisoned")
    }

    pub fn active_mint_condition(&self) -> Result<chain_core::UnlockCondition, minting_state::StateError> {
        self.store.read().expect("chain state lock poisoned").active_mint_condition()
    }

    pub fn mint_condition_at(
        &self,
        h: BlockHeight,
    ) -> Result<chain_core::UnlockCondition, minting_state::StateError> {
        self.store.read().expect("chain state lock poisoned").mint_condition_at(h)
    }

    /// Applies one consensus change to every piece of in-memory state this
    /// node core is responsible for: the minting plugin's store and this
    /// struct's own tip/UTXO view. Does not touch the pool or wallet;
    /// callers (the `Daemon`) forward the same change to those separately.
    pub fn apply_consensus_change(&self, cc: &ConsensusChange) -> Result<(), minting_state::StateError> {
        {
            let mut store = self.store.write().expect("chain state lock poisoned");
            store.revert_blocks(&cc.reverted_blocks)?;
            store.apply_blocks(&cc.applied_blocks)?;
        }

        let mut coins = self.coin_outputs.write().expect("chain state lock poisoned");
        let mut stakes = self.block_stake_outputs.write().expect("chain state lock poisoned");
        for diff in &cc.coin_output_diffs {
            match diff.direction {
                DiffDirection::Apply => {
                    coins.insert(diff.id, diff.output.clone());
                }
                DiffDirection::Revert => {
                    coins.remove(&diff.id);
                }
            }
        }
        for diff in &cc.block_stake_output_diffs {
            match diff.direction {
                DiffDirection::Apply => {
                    stakes.insert(diff.id, diff.output.clone());
                }
                DiffDirection::Revert => {
                    stakes.remove(&diff.id);
                }
            }
        }
        drop(coins);
        drop(stakes);

        if let Some(last) = cc.applied_blocks.last() {
            *self.height.write().expect("chain state lock poisoned") = last.height();
            *self.time.write().expect("chain state lock poisoned") = last.header.timestamp;
        }
        Ok(())
    }

    fn validation_context(&self) -> Result<(BlockHeight, DateTime<Utc>, chain_core::UnlockCondition), minting_state::StateError> {
        let height = self.height();
        let time = self.time();
        let condition = self.active_mint_condition()?;
        Ok((height, time, condition))
    }
}

/// Bridges `ChainState` to the transaction pool's view of the consensus
/// collaborator: a dry-run validator and the current tip height.
pub struct PoolConsensusAdapter {
    chain: Arc<ChainState>,
}

impl PoolConsensusAdapter {
    pub fn new(chain: Arc<ChainState>) -> PoolConsensusAdapter {
        PoolConsensusAdapter { chain }
    }
}

impl txpool::ConsensusSet for PoolConsensusAdapter {
    fn height(&self) -> BlockHeight {
        self.chain.height()
    }

    fn try_transaction_set(&self, set: &[Transaction]) -> Result<(), PoolBoxError> {
        let (height, time, active_mint_condition) = self
            .chain
            .validation_context()
            .map_err(|e| -> PoolBoxError { Box::new(e) })?;
        let ctx = ValidationContext {
            height,
            time,
            active_mint_condition: &active_mint_condition,
        };

        let coins = self.chain.coin_outputs.read().expect("chain state lock poisoned");
        let stakes = self.chain.block_stake_outputs.read().expect("chain state lock poisoned");
        let mut spent = std::collections::HashSet::new();
        for tx in set {
            self.chain
                .registry
                .validate(tx, &ctx)
                .map_err(|e| -> PoolBoxError { Box::new(e) })?;
            for input in &tx.coin_inputs {
                if !coins.contains_key(&input.parent_id) {
                    return Err(format!("unknown coin output {}", input.parent_id).into());
                }
                if !spent.insert(input.parent_id) {
                    return Err(format!("double spend of coin output {}", input.parent_id).into());
                }
            }
            for input in &tx.block_stake_inputs {
                if !stakes.contains_key(&input.parent_id) {
                    return Err(format!("unknown block stake output {}", input.parent_id).into());
                }
                if !spent.insert(input.parent_id) {
                    return Err(format!("double spend of block stake output {}", input.parent_id).into());
                }
            }
        }
        Ok(())
    }
}

/// Bridges `ChainState` to the wallet's view of the consensus
/// collaborator: output lookups for transactions the wallet didn't itself
/// originate.
pub struct WalletConsensusAdapter {
    chain: Arc<ChainState>,
}

impl WalletConsensusAdapter {
    pub fn new(chain: Arc<ChainState>) -> WalletConsensusAdapter {
        WalletConsensusAdapter { chain }
    }
}

impl wallet::ConsensusHandle for WalletConsensusAdapter {
    fn height(&self) -> BlockHeight {
        self.chain.height()
    }

    fn time(&self) -> DateTime<Utc> {
        self.chain.time()
    }

    fn get_coin_output(&self, id: &OutputId) -> Option<CoinOutput> {
        self.chain
            .coin_outputs
            .read()
            .expect("chain state lock poisoned")
            .get(id)
            .cloned()
    }

    fn get_block_stake_output(&self, id: &OutputId) -> Option<BlockStakeOutput> {
        self.chain
            .block_stake_outputs
            .read()
            .expect("chain state lock poisoned")
            .get(id)
            .cloned()
    }
}

/// Stands in for the real peer-to-peer gateway, which lives outside this
/// core (§1's explicit non-goal). Logs what would have gone out over the
/// wire so the admission/rebroadcast pipeline has somewhere to send to.
pub struct LoggingGateway;

impl txpool::Gateway for LoggingGateway {
    fn broadcast(&self, name: &str, payload: &[u8]) {
        tracing::info!(rpc = name, bytes = payload.len(), "broadcasting to peers");
    }
}

/// Bridges the wallet's `PoolHandle` to the real admission pool.
pub struct WalletPoolAdapter {
    pool: Arc<txpool::Pool<PoolConsensusAdapter, LoggingGateway>>,
}

impl WalletPoolAdapter {
    pub fn new(pool: Arc<txpool::Pool<PoolConsensusAdapter, LoggingGateway>>) -> WalletPoolAdapter {
        WalletPoolAdapter { pool }
    }
}

impl wallet::PoolHandle for WalletPoolAdapter {
    fn submit(&self, set: Vec<Transaction>) -> Result<(), WalletBoxError> {
        self.pool
            .admit(set)
            .map(|_| ())
            .map_err(|e| -> WalletBoxError { Box::new(e) })
    }
}
