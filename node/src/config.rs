use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The daemon's full configuration: its own runtime knobs plus every
/// subsystem's config, all loadable from one TOML file and overridable by
/// CLI flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_addr: String,
    pub rpc_addr: String,
    /// Which subsystems to run, as a character set drawn from
    /// `{g,c,t,w,b,e}` (gateway, consensus, transactionpool, wallet,
    /// blockcreator, explorer).
    pub modules: String,
    pub no_bootstrap: bool,
    pub authenticate_api: bool,
    pub disable_api_security: bool,
    pub profile: Option<String>,
    pub profile_directory: Option<PathBuf>,

    /// The genesis mint condition, fixed per network. Rivine-derived
    /// chains bake this into their chain constants; here it is config so
    /// mainnet/testnet/devnet can each supply their own without a
    /// recompile.
    pub genesis_mint_condition: chain_core::UnlockCondition,

    #[serde(default)]
    pub minting_state: minting_state::Config,
    #[serde(default)]
    pub minting_tx: minting_tx::Config,
    #[serde(default)]
    pub txpool: txpool::Config,
    #[serde(default)]
    pub wallet: wallet::Config,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pobsd");
        Config {
            minting_state: minting_state::Config {
                cache_dir: data_dir.join("minting-state"),
            },
            data_dir,
            api_addr: "127.0.0.1:7982".to_string(),
            rpc_addr: "127.0.0.1:7983".to_string(),
            modules: "gctwbe".to_string(),
            no_bootstrap: false,
            authenticate_api: false,
            disable_api_security: false,
            profile: None,
            profile_directory: None,
            genesis_mint_condition: chain_core::UnlockCondition::UnlockHash(
                chain_core::UnlockHash::new(
                    chain_core::UnlockHashType::PubKey,
                    chain_core::Hash::of_parts(&[b"genesis"]),
                ),
            ),
            minting_tx: minting_tx::Config::default(),
            txpool: txpool::Config::default(),
            wallet: wallet::Config::default(),
        }
    }
}

impl Config {
    /// Loads a TOML config file if `path` exists, otherwise starts from
    /// `Config::default()`; either way, non-default CLI flags from `cli`
    /// take precedence.
    pub fn load(path: Option<&std::path::Path>, cli: &crate::cli::Cli) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p).map_err(ConfigError::Io)?;
                toml::from_str(&raw).map_err(ConfigError::Parse)?
            }
            _ => Config::default(),
        };
        cli.apply_overrides(&mut config);
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(toml::de::Error),
}
