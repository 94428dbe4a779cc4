use serde::{Deserialize, Serialize};

/// The transaction version the wallet tags its own generic transfers with.
/// Not a minting-family version; no `TxController` validates it, so its
/// only enforced rules are the generic envelope invariants and whatever
/// the wallet's own builder checks before submission.
pub const TRANSFER_VERSION: u64 = 0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Outputs spent by a transaction the wallet itself built are skipped
    /// by `fund_coins`/`fund_block_stakes` for this many blocks, so a
    /// dropped or slow-to-confirm transaction doesn't get its inputs
    /// double-spent by the next build.
    pub respend_timeout: u64,
    /// How many keys beyond the highest-used index to keep pre-derived in
    /// the lookahead map.
    pub lookahead_window: u64,
    /// If an incoming output's address is this many indices beyond the
    /// lookahead window, a full rescan is warranted rather than a simple
    /// on-demand extension.
    pub rescan_threshold: u64,
    pub arbitrary_data_limit: usize,
    pub transfer_fee: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            respend_timeout: 36,
            lookahead_window: 25,
            rescan_threshold: 1000,
            arbitrary_data_limit: 83,
            transfer_fee: 10,
        }
    }
}
