//! Admission pool for minting-family transaction sets: consensus dry-run
//! on the way in, reconciliation against `ConsensusChange` notifications,
//! and rebroadcast of long-unconfirmed sets.

mod collaborators;
mod config;
mod error;
mod pool;
mod set;

pub use collaborators::{ConsensusSet, Gateway};
pub use config::Config;
pub use error::{BoxError, PoolError};
pub use pool::Pool;
pub use set::{SetId, SetStatus, TransactionSet};

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{
        CodecFlavor, CoinInput, CoinOutput, Currency, Hash, OutputId, Transaction,
        UnlockCondition, UnlockFulfillment, UnlockHash, UnlockHashType,
    };
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockConsensus {
        height: chain_core::BlockHeight,
        spent: Mutex<std::collections::HashSet<OutputId>>,
    }

    impl ConsensusSet for MockConsensus {
        fn height(&self) -> chain_core::BlockHeight {
            self.height
        }

        fn try_transaction_set(&self, set: &[Transaction]) -> Result<(), BoxError> {
            let mut spent = self.spent.lock().unwrap();
            let mut claimed = std::collections::HashSet::new();
            for tx in set {
                for input in &tx.coin_inputs {
                    if spent.contains(&input.parent_id) || !claimed.insert(input.parent_id) {
                        return Err("double spend".into());
                    }
                }
            }
            for tx in set {
                for input in &tx.coin_inputs {
                    spent.insert(input.parent_id);
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockGateway {
        broadcast_count: AtomicBool,
    }

    impl Gateway for MockGateway {
        fn broadcast(&self, _name: &str, _payload: &[u8]) {
            self.broadcast_count.store(true, Ordering::SeqCst);
        }
    }

    fn unlock_hash(tag: &str) -> UnlockHash {
        UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[tag.as_bytes()]))
    }

    fn spending_tx(parent: OutputId, nonce: u8) -> Transaction {
        Transaction {
            version: 1,
            coin_inputs: vec![CoinInput {
                parent_id: parent,
                fulfillment: UnlockFulfillment::Nil,
            }],
            coin_outputs: vec![CoinOutput {
                value: Currency::from_u64(100),
                condition: UnlockCondition::UnlockHash(unlock_hash("recipient")),
            }],
            block_stake_inputs: vec![],
            block_stake_outputs: vec![],
            miner_fees: vec![Currency::from_u64(1)],
            arbitrary_data: vec![nonce],
            extension: None,
        }
    }

    fn test_pool() -> (Arc<Pool<MockConsensus, MockGateway>>, OutputId) {
        test_support::init();
        let parent = OutputId::derive(
            chain_core::specifier::COIN_OUTPUT_ID,
            Hash::of_parts(&[b"genesis"]),
            0,
        );
        let consensus = Arc::new(MockConsensus {
            height: chain_core::BlockHeight(10),
            spent: Mutex::new(std::collections::HashSet::new()),
        });
        let gateway = Arc::new(MockGateway::default());
        let pool = Pool::new(consensus, gateway, Config::default(), CodecFlavor::Compact);
        (pool, parent)
    }

    #[test]
    fn admitting_two_sets_spending_the_same_output_conflicts() {
        let (pool, parent) = test_pool();
        let s1 = vec![spending_tx(parent, 1)];
        let id1 = pool.admit(s1).expect("first set admitted");
        assert!(pool.contains(&id1));

        let s2 = vec![spending_tx(parent, 2)];
        let err = pool.admit(s2).unwrap_err();
        assert!(matches!(err, PoolError::Conflict(_)));
    }

    #[test]
    fn admitting_an_empty_set_is_rejected() {
        let (pool, _parent) = test_pool();
        let err = pool.admit(vec![]).unwrap_err();
        assert!(matches!(err, PoolError::Empty));
    }

    #[test]
    fn readmitting_the_identical_set_is_a_duplicate() {
        let (pool, parent) = test_pool();
        let set = vec![spending_tx(parent, 1)];
        pool.admit(set.clone()).unwrap();
        let err = pool.admit(set).unwrap_err();
        assert!(matches!(err, PoolError::DuplicateSet));
    }

    proptest::proptest! {
        /// Distinct, non-conflicting single-transaction sets never collide:
        /// each nonce derives its own synthetic parent output, so admitting
        /// all of them leaves exactly that many sets in the pool with no
        /// `Conflict`/`DuplicateSet` rejections.
        #[test]
        fn distinct_outputs_admit_without_conflict(nonces in proptest::collection::hash_set(0u8..=255, 1..20)) {
            let (pool, _parent) = test_pool();
            let mut admitted = 0;
            for nonce in &nonces {
                let parent = OutputId::derive(
                    chain_core::specifier::COIN_OUTPUT_ID,
                    Hash::of_parts(&[b"nonce", &[*nonce]]),
                    0,
                );
                let set = vec![spending_tx(parent, *nonce)];
                prop_assert!(pool.admit(set).is_ok());
                admitted += 1;
            }
            prop_assert_eq!(pool.transaction_list().len(), admitted);
        }
    }

    #[tokio::test]
    async fn consensus_change_absorbs_confirmed_set_and_frees_its_output() {
        let (pool, parent) = test_pool();
        let tx_a = spending_tx(parent, 1);
        pool.admit(vec![tx_a.clone()]).unwrap();
        assert_eq!(pool.transaction_list().len(), 1);

        let header = chain_core::BlockHeader {
            parent_id: chain_core::BlockId(Hash::of_parts(&[b"parent"])),
            timestamp: chrono::Utc::now(),
            height: chain_core::BlockHeight(11),
        };
        let block = chain_core::Block {
            header,
            transactions: vec![tx_a],
        };
        let cc = chain_core::ConsensusChange {
            id: chain_core::ConsensusChangeId(Hash::of_parts(&[b"cc1"])),
            reverted_blocks: vec![],
            applied_blocks: vec![block],
            coin_output_diffs: vec![],
            block_stake_output_diffs: vec![],
            synced: false,
        };

        pool.consensus_change(&cc);
        // The reconciliation spawns a background task; give it a tick to run.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(pool.transaction_list().len(), 0);
    }
}
