use std::collections::{BTreeSet, HashMap};

use chain_core::{
    BlockHeight, BlockStakeOutput, BlockStakeOutputDiff, CoinOutput, CoinOutputDiff, ConsensusChange,
    DiffDirection, Hash, OutputId, Transaction, UnlockCondition, UnlockHash,
};

use crate::keystore::KeyStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relevance {
    Wallet,
    MultisigWallet(UnlockHash),
    None,
}

fn as_multisig(condition: &UnlockCondition) -> Option<(&BTreeSet<UnlockHash>, u64)> {
    match condition {
        UnlockCondition::MultiSig { owners, min_sigs } => Some((owners, *min_sigs)),
        UnlockCondition::TimeLock { inner, .. } => as_multisig(inner),
        _ => None,
    }
}

pub fn classify(condition: &UnlockCondition, keystore: &KeyStore) -> Relevance {
    let uh = condition.unlock_hash();
    if keystore.is_known(&uh) {
        return Relevance::Wallet;
    }
    if let Some((owners, _)) = as_multisig(condition) {
        if owners.iter().any(|o| keystore.is_known(o)) {
            return Relevance::MultisigWallet(uh);
        }
    }
    Relevance::None
}

#[derive(Clone)]
pub struct OwnedCoinOutput {
    pub id: OutputId,
    pub output: CoinOutput,
    pub relevance: Relevance,
}

#[derive(Clone)]
pub struct OwnedBlockStakeOutput {
    pub id: OutputId,
    pub output: BlockStakeOutput,
    pub relevance: Relevance,
}

#[derive(Clone, Copy, Debug)]
pub struct ProcessedTx {
    pub height: BlockHeight,
    pub tx_id: Hash,
}

/// Everything the wallet derives from `ConsensusChange`/unconfirmed
/// notifications: which outputs it owns (directly or via a multisig it
/// participates in), and the transaction history used for balance and
/// history queries.
#[derive(Default)]
pub struct Tracker {
    pub coin_outputs: HashMap<OutputId, OwnedCoinOutput>,
    pub block_stake_outputs: HashMap<OutputId, OwnedBlockStakeOutput>,
    /// Ordered by ascending confirmation height, for range queries and
    /// tail-popping on revert.
    pub processed_transactions: Vec<ProcessedTx>,
    pub unconfirmed_processed_transactions: Vec<Transaction>,
}

impl Tracker {
    pub fn apply_consensus_change(&mut self, cc: &ConsensusChange, keystore: &KeyStore) {
        for block in &cc.reverted_blocks {
            let ids: Vec<Hash> = block.transactions.iter().map(|t| t.id()).collect();
            while let Some(last) = self.processed_transactions.last() {
                if ids.contains(&last.tx_id) {
                    self.processed_transactions.pop();
                } else {
                    break;
                }
            }
        }

        for diff in &cc.coin_output_diffs {
            self.apply_coin_diff(diff, keystore);
        }
        for diff in &cc.block_stake_output_diffs {
            self.apply_block_stake_diff(diff, keystore);
        }

        for block in &cc.applied_blocks {
            for tx in &block.transactions {
                let relevant = tx.coin_outputs.iter().any(|o| classify(&o.condition, keystore) != Relevance::None)
                    || tx.block_stake_outputs.iter().any(|o| classify(&o.condition, keystore) != Relevance::None)
                    || tx.coin_inputs.iter().any(|i| self.coin_outputs.contains_key(&i.parent_id))
                    || tx.block_stake_inputs.iter().any(|i| self.block_stake_outputs.contains_key(&i.parent_id));
                if relevant {
                    self.processed_transactions.push(ProcessedTx {
                        height: block.height(),
                        tx_id: tx.id(),
                    });
                }
            }
        }
    }

    fn apply_coin_diff(&mut self, diff: &CoinOutputDiff, keystore: &KeyStore) {
        match diff.direction {
            DiffDirection::Apply => {
                let relevance = classify(&diff.output.condition, keystore);
                if relevance != Relevance::None {
                    self.coin_outputs.insert(
                        diff.id,
                        OwnedCoinOutput {
                            id: diff.id,
                            output: diff.output.clone(),
                            relevance,
                        },
                    );
                }
            }
            DiffDirection::Revert => {
                self.coin_outputs.remove(&diff.id);
            }
        }
    }

    fn apply_block_stake_diff(&mut self, diff: &BlockStakeOutputDiff, keystore: &KeyStore) {
        match diff.direction {
            DiffDirection::Apply => {
                let relevance = classify(&diff.output.condition, keystore);
                if relevance != Relevance::None {
                    self.block_stake_outputs.insert(
                        diff.id,
                        OwnedBlockStakeOutput {
                            id: diff.id,
                            output: diff.output.clone(),
                            relevance,
                        },
                    );
                }
            }
            DiffDirection::Revert => {
                self.block_stake_outputs.remove(&diff.id);
            }
        }
    }

    pub fn receive_updated_unconfirmed(&mut self, txns: Vec<Transaction>) {
        self.unconfirmed_processed_transactions = txns;
    }
}
