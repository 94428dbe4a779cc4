use std::sync::Arc;

use chain_core::ConsensusChange;
use tokio::sync::RwLock;

use crate::chain::{ChainState, LoggingGateway, PoolConsensusAdapter, WalletConsensusAdapter, WalletPoolAdapter};
use crate::config::Config;

pub type Pool = txpool::Pool<PoolConsensusAdapter, LoggingGateway>;

/// The composition root: everything constructed once at bootstrap and
/// shared through `Arc`/interior-mutability handles for the rest of the
/// process's life. No subsystem reaches into another's internals directly;
/// each only holds the collaborator traits it declared.
pub struct Daemon {
    pub config: Config,
    pub chain: Arc<ChainState>,
    pub pool: Arc<Pool>,
    pub wallet: RwLock<wallet::Wallet>,
}

impl Daemon {
    pub fn bootstrap(config: Config) -> Result<Daemon, Box<dyn std::error::Error + Send + Sync>> {
        std::fs::create_dir_all(&config.data_dir)?;

        let registry = minting_tx::ControllerRegistry::new(chain_core::CodecFlavor::Compact, config.minting_tx.clone());

        let store = minting_state::MintConditionStore::open(
            &config.minting_state,
            config.genesis_mint_condition.clone(),
            config.minting_tx.minter_definition_version,
        )?;

        let chain = Arc::new(ChainState::new(store, registry));
        let consensus_adapter = Arc::new(PoolConsensusAdapter::new(Arc::clone(&chain)));
        let pool = txpool::Pool::new(
            consensus_adapter,
            Arc::new(LoggingGateway),
            config.txpool.clone(),
            chain_core::CodecFlavor::Compact,
        );

        let wallet_consensus: Arc<dyn wallet::ConsensusHandle> =
            Arc::new(WalletConsensusAdapter::new(Arc::clone(&chain)));
        let wallet_pool: Arc<dyn wallet::PoolHandle> = Arc::new(WalletPoolAdapter::new(Arc::clone(&pool)));
        let seed = wallet::Seed::generate();
        let w = wallet::Wallet::new(seed, config.wallet.clone(), wallet_consensus, wallet_pool);

        Ok(Daemon {
            config,
            chain,
            pool,
            wallet: RwLock::new(w),
        })
    }

    /// The single entry point external collaborators (consensus
    /// subscription, not built here) push chain updates through. Fans the
    /// change out to every subscriber in the order §5 requires: the
    /// minting plugin and UTXO view first, then the pool, then the wallet.
    pub async fn apply_consensus_change(&self, cc: &ConsensusChange) {
        if let Err(e) = self.chain.apply_consensus_change(cc) {
            tracing::error!(error = %e, "minting plugin failed to apply consensus change");
            return;
        }
        self.pool.consensus_change(cc);
        self.wallet.write().await.apply_consensus_change(cc);
    }
}
