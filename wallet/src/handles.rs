use chain_core::{BlockHeight, CoinOutput, BlockStakeOutput, OutputId, Transaction};
use chrono::{DateTime, Utc};

use crate::error::BoxError;

/// The slice of the consensus collaborator the wallet needs: enough to
/// build a `FulfillContext` for the current tip and to resolve inputs by
/// ID when signing a transaction it did not itself fund.
pub trait ConsensusHandle: Send + Sync {
    fn height(&self) -> BlockHeight;
    fn time(&self) -> DateTime<Utc>;
    fn get_coin_output(&self, id: &OutputId) -> Option<CoinOutput>;
    fn get_block_stake_output(&self, id: &OutputId) -> Option<BlockStakeOutput>;
}

/// Where finished transactions go. Kept as a trait, rather than a direct
/// dependency on the pool crate, so the wallet and the pool do not form a
/// compile-time cycle; the daemon wiring supplies the real implementation.
pub trait PoolHandle: Send + Sync {
    fn submit(&self, set: Vec<Transaction>) -> Result<(), BoxError>;
}
