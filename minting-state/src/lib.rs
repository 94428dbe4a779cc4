//! The minting plugin: a height-indexed persistent store of the active
//! mint condition, updated by apply/revert as consensus changes arrive.

mod config;
mod error;
mod store;

pub use config::Config;
pub use error::{BoxError, StateError};
pub use store::MintConditionStore;

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{
        BlockHeight, Hash, UnlockCondition, UnlockHash, UnlockHashType,
    };
    use chain_core::block::{Block, BlockHeader, BlockId};
    use chrono::Utc;

    fn tmp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            cache_dir: dir.path().to_path_buf(),
        };
        (dir, cfg)
    }

    fn block_at(height: u64) -> Block {
        Block {
            header: BlockHeader {
                parent_id: BlockId(Hash([0u8; 32])),
                timestamp: Utc::now(),
                height: BlockHeight(height),
            },
            transactions: vec![],
        }
    }

    fn pubkey_condition(tag: &[u8]) -> UnlockCondition {
        UnlockCondition::UnlockHash(UnlockHash::new(UnlockHashType::PubKey, Hash::of_parts(&[tag])))
    }

    #[test]
    fn genesis_lookup_scenario() {
        test_support::init();
        let (_dir, cfg) = tmp_config();
        let c0 = pubkey_condition(b"c0");
        let mut store = MintConditionStore::open(&cfg, c0.clone(), 2).unwrap();
        store.apply_blocks(&[block_at(0)]).unwrap();

        assert_eq!(store.active_mint_condition().unwrap(), c0);
        assert_eq!(store.mint_condition_at(BlockHeight(42)).unwrap(), c0);
    }

    #[test]
    fn reassignment_and_revert_scenario() {
        test_support::init();
        let (_dir, cfg) = tmp_config();
        let c0 = pubkey_condition(b"c0");
        let mut store = MintConditionStore::open(&cfg, c0.clone(), 2).unwrap();
        store.apply_blocks(&[block_at(0)]).unwrap();

        let c1 = pubkey_condition(b"c1");
        let mut block100 = block_at(100);
        block100.transactions.push(chain_core::Transaction {
            version: 2,
            coin_inputs: vec![],
            coin_outputs: vec![],
            block_stake_inputs: vec![],
            block_stake_outputs: vec![],
            miner_fees: vec![],
            arbitrary_data: vec![],
            extension: Some(chain_core::Extension::MinterDefinition {
                nonce: [1u8; 8],
                mint_fulfillment: chain_core::UnlockFulfillment::Nil,
                mint_condition: c1.clone(),
            }),
        });
        store.apply_blocks(&[block100.clone()]).unwrap();

        assert_eq!(store.active_mint_condition().unwrap(), c1);
        assert_eq!(store.mint_condition_at(BlockHeight(99)).unwrap(), c0);
        assert_eq!(store.mint_condition_at(BlockHeight(100)).unwrap(), c1);

        store.revert_blocks(&[block100]).unwrap();
        assert_eq!(store.active_mint_condition().unwrap(), c0);
    }

    #[test]
    fn reverting_a_block_with_no_minter_definition_is_a_no_op() {
        test_support::init();
        let (_dir, cfg) = tmp_config();
        let c0 = pubkey_condition(b"c0");
        let mut store = MintConditionStore::open(&cfg, c0.clone(), 2).unwrap();
        store.apply_blocks(&[block_at(0)]).unwrap();
        store.apply_blocks(&[block_at(5)]).unwrap();

        assert_eq!(store.active_mint_condition().unwrap(), c0);
        store.revert_blocks(&[block_at(5)]).unwrap();
        assert_eq!(store.active_mint_condition().unwrap(), c0);
    }

    #[test]
    fn reopening_with_a_different_genesis_condition_errors() {
        test_support::init();
        let (_dir, cfg) = tmp_config();
        let c0 = pubkey_condition(b"c0");
        {
            let mut store = MintConditionStore::open(&cfg, c0.clone(), 2).unwrap();
            store.apply_blocks(&[block_at(0)]).unwrap();
            store.close().unwrap();
        }
        let c_other = pubkey_condition(b"different");
        let reopened = MintConditionStore::open(&cfg, c_other, 2);
        assert!(matches!(reopened, Err(StateError::GenesisMismatch)));
    }
}
