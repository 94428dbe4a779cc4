use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime tuning for the minting plugin's persistent store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory the sled database lives in. A subdirectory named after
    /// the bucket is created underneath it.
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_dir: PathBuf::from("minting-state"),
        }
    }
}
