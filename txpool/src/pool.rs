use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chain_core::{BlockHeight, CodecFlavor, ConsensusChange, Encode, Hash, Transaction};

use crate::collaborators::{ConsensusSet, Gateway};
use crate::config::Config;
use crate::error::PoolError;
use crate::set::{decode_transaction_set, SetId, SetStatus, TransactionSet};

/// Tracks when a set first entered the pool and when it was last offered to
/// peers, so rebroadcast can back off instead of hammering the network on
/// every consensus change.
#[derive(Clone, Copy, Debug)]
struct BroadcastRecord {
    add_height: BlockHeight,
    last_broadcast_height: BlockHeight,
}

#[derive(Default)]
struct PoolInner {
    sets: HashMap<SetId, TransactionSet>,
    /// Reverse index from a transaction's own ID to the set that carries
    /// it, so a newly confirmed transaction can find (and retire) its set
    /// without a full scan.
    tx_index: HashMap<Hash, SetId>,
    broadcast_cache: HashMap<SetId, BroadcastRecord>,
    confirmed_txids: HashSet<Hash>,
    total_size: usize,
}

impl PoolInner {
    fn purge(&mut self) -> Vec<TransactionSet> {
        let sets = std::mem::take(&mut self.sets).into_values().collect();
        self.tx_index.clear();
        self.broadcast_cache.clear();
        self.total_size = 0;
        sets
    }
}

/// The admission pool: an ordered collection of `TransactionSet`s that have
/// passed a consensus dry-run but are not yet confirmed on-chain.
pub struct Pool<C, G> {
    inner: RwLock<PoolInner>,
    consensus: Arc<C>,
    gateway: Arc<G>,
    config: Config,
    flavor: CodecFlavor,
}

impl<C, G> Pool<C, G>
where
    C: ConsensusSet + 'static,
    G: Gateway + 'static,
{
    pub fn new(consensus: Arc<C>, gateway: Arc<G>, config: Config, flavor: CodecFlavor) -> Arc<Self> {
        Arc::new(Pool {
            inner: RwLock::new(PoolInner::default()),
            consensus,
            gateway,
            config,
            flavor,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, PoolInner> {
        self.inner.read().expect("pool lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PoolInner> {
        self.inner.write().expect("pool lock poisoned")
    }

    /// `Admit(set)`: drop already-confirmed members, size-check, dry-run
    /// against consensus, then append on success.
    pub fn admit(&self, set: Vec<Transaction>) -> Result<SetId, PoolError> {
        let remaining: Vec<Transaction> = {
            let inner = self.read();
            set.into_iter()
                .filter(|tx| !inner.confirmed_txids.contains(&tx.id()))
                .collect()
        };
        if remaining.is_empty() {
            return Err(PoolError::Empty);
        }

        let id = SetId::derive(&remaining, self.flavor)?;

        let encoded_size = remaining
            .iter()
            .map(|tx| tx.encode_to_vec(self.flavor).map(|b| b.len()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PoolError::Conflict(Box::new(e)))?;
        for sz in &encoded_size {
            if *sz > self.config.transaction_size_limit {
                return Err(PoolError::TooLarge);
            }
        }
        let set_size: usize = encoded_size.iter().sum();
        if set_size > self.config.set_size_limit {
            return Err(PoolError::TooLarge);
        }

        {
            let inner = self.read();
            if inner.sets.contains_key(&id) {
                return Err(PoolError::DuplicateSet);
            }
            if inner.total_size + set_size > self.config.pool_size_limit {
                return Err(PoolError::Full);
            }
        }

        self.consensus
            .try_transaction_set(&remaining)
            .map_err(PoolError::Conflict)?;

        let height = self.consensus.height();
        let mut inner = self.write();
        // Re-check under the write lock: another admission may have raced
        // us between the dry-run and now.
        if inner.sets.contains_key(&id) {
            return Err(PoolError::DuplicateSet);
        }
        if inner.total_size + set_size > self.config.pool_size_limit {
            return Err(PoolError::Full);
        }
        for tx in &remaining {
            inner.tx_index.insert(tx.id(), id);
        }
        let transaction_set = TransactionSet {
            id,
            transactions: remaining,
            encoded_size: set_size,
        };
        inner.sets.insert(id, transaction_set);
        inner.broadcast_cache.insert(
            id,
            BroadcastRecord {
                add_height: height,
                last_broadcast_height: height,
            },
        );
        inner.total_size += set_size;
        tracing::info!(set_id = %id, status = ?SetStatus::Admitted, "transaction set admitted");
        Ok(id)
    }

    /// Decode a peer-relayed payload, bounded by `size_ceiling` (the chain
    /// block-size limit), admit it, and on success broadcast it onward.
    pub fn relay(&self, payload: &[u8], size_ceiling: usize) -> Result<SetId, PoolError> {
        if payload.len() > size_ceiling {
            return Err(PoolError::TooLarge);
        }
        let set = decode_transaction_set(payload, self.flavor)?;
        let id = self.admit(set)?;
        self.gateway.broadcast("RelayTransactionSet", payload);
        Ok(id)
    }

    /// All sets currently visible as `Admitted`.
    pub fn transaction_list(&self) -> Vec<TransactionSet> {
        self.read().sets.values().cloned().collect()
    }

    pub fn contains(&self, id: &SetId) -> bool {
        self.read().sets.contains_key(id)
    }

    pub fn total_size(&self) -> usize {
        self.read().total_size
    }
}

impl<C, G> Pool<C, G>
where
    C: ConsensusSet + 'static,
    G: Gateway + 'static,
{
    /// Reconcile the pool against a consensus change. Reverts are applied
    /// before applies; the pool is purged and its surviving sets
    /// re-admitted on a spawned task, since the caller may be holding the
    /// consensus subsystem's own lock for the duration of this call.
    pub fn consensus_change(self: &Arc<Self>, cc: &ConsensusChange) {
        let (to_readmit, synced) = {
            let mut inner = self.write();

            for block in &cc.reverted_blocks {
                for tx in &block.transactions {
                    inner.confirmed_txids.remove(&tx.id());
                }
            }

            let txids: HashSet<Hash> = cc.applied_tx_ids().into_iter().collect();
            for block in &cc.applied_blocks {
                for tx in &block.transactions {
                    let txid = tx.id();
                    inner.confirmed_txids.insert(txid);
                    if let Some(set_id) = inner.tx_index.get(&txid).copied() {
                        inner.broadcast_cache.remove(&set_id);
                    }
                }
            }

            let snapshot = inner.purge();

            let to_readmit: Vec<Vec<Transaction>> = snapshot
                .into_iter()
                .map(|set| {
                    let original_len = set.transactions.len();
                    let remaining: Vec<Transaction> = set
                        .transactions
                        .into_iter()
                        .filter(|tx| !txids.contains(&tx.id()))
                        .collect();
                    if remaining.len() != original_len {
                        tracing::debug!(set_id = %set.id, "stripped absorbed transactions from set");
                    }
                    remaining
                })
                .filter(|txs| !txs.is_empty())
                .collect();

            (to_readmit, cc.synced)
        };

        let pool = Arc::clone(self);
        let tip_height = self.consensus.height();
        tokio::spawn(async move {
            for remaining in to_readmit {
                match pool.admit(remaining) {
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "set dropped on re-admission after consensus change"),
                }
            }

            if synced {
                pool.rebroadcast_eligible(tip_height);
            }
        });
    }

    fn rebroadcast_eligible(&self, tip_height: BlockHeight) {
        let due: Vec<(SetId, Vec<u8>)> = {
            let mut inner = self.write();
            let mut due = Vec::new();
            for (id, set) in inner.sets.clone() {
                let Some(record) = inner.broadcast_cache.get_mut(&id) else {
                    continue;
                };
                let elapsed = tip_height.0.saturating_sub(record.last_broadcast_height.0);
                if elapsed < self.config.rebroadcast_interval {
                    continue;
                }
                record.last_broadcast_height = tip_height;
                if let Ok(bytes) = set.transactions.encode_to_vec(self.flavor) {
                    due.push((id, bytes));
                }
            }
            due
        };

        for (id, bytes) in due {
            tracing::debug!(set_id = %id, status = ?SetStatus::Rebroadcast, "rebroadcasting transaction set");
            self.gateway.broadcast("RelayTransactionSet", &bytes);
        }
    }
}
