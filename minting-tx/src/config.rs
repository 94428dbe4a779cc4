use serde::{Deserialize, Serialize};

/// Per-network tunables the upstream chain fixes in its chain constants;
/// kept as config here rather than hardcoded so mainnet/testnet/devnet can
/// diverge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub block_size_limit: usize,
    pub arbitrary_data_limit: usize,
    pub minimum_miner_fee: u64,
    pub minter_definition_version: u64,
    pub coin_creation_version: u64,
    pub coin_destruction_version: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            block_size_limit: 2 * 1024 * 1024,
            arbitrary_data_limit: 83,
            minimum_miner_fee: 1_000_000,
            coin_creation_version: 129,
            minter_definition_version: 130,
            coin_destruction_version: 1,
        }
    }
}
