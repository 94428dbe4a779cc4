use crate::block::{Block, BlockId};
use crate::outputs::{BlockStakeOutput, CoinOutput, OutputId};
use serde::{Deserialize, Serialize};

/// The direction a diff was observed in: a forward chain extension applies
/// it, a reorg revert undoes it. Handlers for the two directions are kept
/// separate rather than folded into one "toggle" function, so each can be
/// audited against its own half of the apply/revert symmetry invariant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DiffDirection {
    Apply,
    Revert,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CoinOutputDiff {
    pub id: OutputId,
    pub output: CoinOutput,
    pub direction: DiffDirection,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BlockStakeOutputDiff {
    pub id: OutputId,
    pub output: BlockStakeOutput,
    pub direction: DiffDirection,
}

/// An identifier for a point in the consensus change stream, handed back
/// by subscribers to resume from on reconnect.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ConsensusChangeId(pub crate::hash::Hash);

/// A single notification pushed to every subsystem subscribed to the
/// consensus collaborator: which blocks were reverted and applied to reach
/// the new tip, and the resulting output diffs in reverted-then-applied
/// order.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConsensusChange {
    pub id: ConsensusChangeId,
    pub reverted_blocks: Vec<Block>,
    pub applied_blocks: Vec<Block>,
    pub coin_output_diffs: Vec<CoinOutputDiff>,
    pub block_stake_output_diffs: Vec<BlockStakeOutputDiff>,
    /// Whether the consensus set believes itself caught up to the network
    /// tip; gates rebroadcast scheduling in the transaction pool.
    pub synced: bool,
}

impl ConsensusChange {
    pub fn reverted_block_ids(&self) -> Vec<BlockId> {
        self.reverted_blocks.iter().map(|b| b.id()).collect()
    }

    pub fn applied_block_ids(&self) -> Vec<BlockId> {
        self.applied_blocks.iter().map(|b| b.id()).collect()
    }

    /// Every transaction ID confirmed by this change, in block order.
    pub fn applied_tx_ids(&self) -> Vec<crate::hash::Hash> {
        self.applied_blocks
            .iter()
            .flat_map(|b| b.transactions.iter())
            .map(|tx| tx.id())
            .collect()
    }
}
