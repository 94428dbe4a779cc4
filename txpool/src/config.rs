use serde::{Deserialize, Serialize};

/// Size limits and rebroadcast tuning for the pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub pool_size_limit: usize,
    pub transaction_size_limit: usize,
    pub set_size_limit: usize,
    /// Number of blocks a set must sit unconfirmed before it is eligible
    /// for another rebroadcast attempt.
    pub rebroadcast_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_size_limit: 20 * 1024 * 1024,
            transaction_size_limit: 16 * 1024,
            set_size_limit: 250 * 1024,
            rebroadcast_interval: 30,
        }
    }
}
