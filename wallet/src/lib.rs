//! HD key management, consensus-driven output tracking, and transaction
//! building for a single wallet.

mod balances;
mod builder;
mod config;
mod error;
mod handles;
mod keystore;
mod locking;
mod seed;
mod storage;
mod tracking;
mod wallet;

pub use balances::MultisigWalletSummary;
pub use builder::{RefundPolicy, TransactionBuilder};
pub use config::Config;
pub use error::{BoxError, WalletError};
pub use handles::{ConsensusHandle, PoolHandle};
pub use keystore::SeedId;
pub use locking::{encrypt_seed, recover_seed};
pub use seed::Seed;
pub use storage::{EncryptedSeed, SeedFile};
pub use tracking::Relevance;
pub use wallet::Wallet;

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{
        Block, BlockHeader, BlockId, BlockStakeOutput, CoinOutput, CoinOutputDiff, ConsensusChange,
        ConsensusChangeId, Currency, DiffDirection, Hash, OutputId, Transaction, UnlockCondition,
    };
    use std::sync::{Arc, Mutex};

    struct MockConsensus {
        height: Mutex<chain_core::BlockHeight>,
    }

    impl ConsensusHandle for MockConsensus {
        fn height(&self) -> chain_core::BlockHeight {
            *self.height.lock().unwrap()
        }
        fn time(&self) -> chrono::DateTime<chrono::Utc> {
            chrono::Utc::now()
        }
        fn get_coin_output(&self, _id: &OutputId) -> Option<CoinOutput> {
            None
        }
        fn get_block_stake_output(&self, _id: &OutputId) -> Option<BlockStakeOutput> {
            None
        }
    }

    #[derive(Default)]
    struct MockPool {
        submitted: Mutex<Vec<Transaction>>,
    }

    impl PoolHandle for MockPool {
        fn submit(&self, set: Vec<Transaction>) -> Result<(), BoxError> {
            self.submitted.lock().unwrap().extend(set);
            Ok(())
        }
    }

    fn wallet_with_one_output(value: u64) -> (Wallet, chain_core::UnlockHash, OutputId) {
        test_support::init();
        let primary = Seed::from_bytes([5u8; 32]);
        let consensus = Arc::new(MockConsensus {
            height: Mutex::new(chain_core::BlockHeight(10)),
        });
        let pool = Arc::new(MockPool::default());
        let mut wallet = Wallet::new(primary, Config::default(), consensus, pool);

        let addr = wallet.generate_address();
        let output_id = OutputId::derive(
            chain_core::specifier::COIN_OUTPUT_ID,
            Hash::of_parts(&[b"genesis-tx"]),
            0,
        );
        let output = CoinOutput {
            value: Currency::from_u64(value),
            condition: UnlockCondition::UnlockHash(addr),
        };
        let block = Block {
            header: BlockHeader {
                parent_id: BlockId(Hash::of_parts(&[b"parent"])),
                timestamp: chrono::Utc::now(),
                height: chain_core::BlockHeight(10),
            },
            transactions: vec![],
        };
        let cc = ConsensusChange {
            id: ConsensusChangeId(Hash::of_parts(&[b"cc"])),
            reverted_blocks: vec![],
            applied_blocks: vec![block],
            coin_output_diffs: vec![CoinOutputDiff {
                id: output_id,
                output,
                direction: DiffDirection::Apply,
            }],
            block_stake_output_diffs: vec![],
            synced: true,
        };
        wallet.apply_consensus_change(&cc);
        (wallet, addr, output_id)
    }

    #[test]
    fn confirmed_balance_reflects_applied_output() {
        let (wallet, _addr, _id) = wallet_with_one_output(10_000);
        assert_eq!(wallet.confirmed_balance(), Currency::from_u64(10_000));
        assert!(wallet.confirmed_locked_balance().is_zero());
    }

    #[test]
    fn send_outputs_produces_expected_inputs_outputs_and_unconfirmed_balance() {
        let (mut wallet, _addr, output_id) = wallet_with_one_output(10_000);
        let recipient = chain_core::UnlockHash::new(
            chain_core::UnlockHashType::PubKey,
            Hash::of_parts(&[b"recipient-x"]),
        );

        let tx = wallet
            .send_outputs(
                vec![CoinOutput {
                    value: Currency::from_u64(2_000),
                    condition: UnlockCondition::UnlockHash(recipient),
                }],
                vec![],
                vec![],
                None,
                false,
                Currency::from_u64(100),
            )
            .unwrap();

        assert_eq!(tx.coin_inputs.len(), 1);
        assert_eq!(tx.coin_inputs[0].parent_id, output_id);
        assert_eq!(tx.coin_outputs.len(), 2);
        let total_out: Currency = tx.coin_outputs.iter().map(|o| o.value.clone()).sum();
        assert_eq!(total_out + tx.total_miner_fees(), Currency::from_u64(10_000));

        wallet.receive_updated_unconfirmed(vec![tx]);
        let (outgoing, incoming) = wallet.unconfirmed_balance();
        assert_eq!(outgoing, Currency::from_u64(10_000));
        assert_eq!(incoming, Currency::from_u64(7_900));
    }
}
