use std::path::PathBuf;

use clap::Parser;

/// Runs the proof-of-block-stake node daemon.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to a TOML config file. Flags below override whatever it sets.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address the consensus/explorer HTTP API binds to.
    #[arg(long)]
    pub api_addr: Option<String>,

    /// Address the Relay RPC binds to.
    #[arg(long)]
    pub rpc_addr: Option<String>,

    /// Modules to run, drawn from the character set {g,c,t,w,b,e}
    /// (gateway, consensus, transactionpool, wallet, blockcreator,
    /// explorer).
    #[arg(long)]
    pub modules: Option<String>,

    /// Skip bootstrapping peer addresses on startup.
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Require API callers to authenticate.
    #[arg(long)]
    pub authenticate_api: bool,

    /// Disable the API security check that otherwise refuses non-local
    /// callers without authentication.
    #[arg(long)]
    pub disable_api_security: bool,

    /// Enable CPU/memory profiling under this named profile.
    #[arg(long)]
    pub profile: Option<String>,

    /// Directory profiling output is written to.
    #[arg(long)]
    pub profile_directory: Option<PathBuf>,

    /// Directory the daemon persists its state under.
    #[arg(long = "pobsd-directory")]
    pub daemon_directory: Option<PathBuf>,
}

impl Cli {
    /// Overlays every flag the caller actually passed onto `config`,
    /// leaving fields the caller left unset at whatever `config` already
    /// had (its TOML value, or `Config::default()`).
    pub fn apply_overrides(&self, config: &mut crate::config::Config) {
        if let Some(v) = &self.api_addr {
            config.api_addr = v.clone();
        }
        if let Some(v) = &self.rpc_addr {
            config.rpc_addr = v.clone();
        }
        if let Some(v) = &self.modules {
            config.modules = v.clone();
        }
        if self.no_bootstrap {
            config.no_bootstrap = true;
        }
        if self.authenticate_api {
            config.authenticate_api = true;
        }
        if self.disable_api_security {
            config.disable_api_security = true;
        }
        if let Some(v) = &self.profile {
            config.profile = Some(v.clone());
        }
        if let Some(v) = &self.profile_directory {
            config.profile_directory = Some(v.clone());
        }
        if let Some(v) = &self.daemon_directory {
            config.data_dir = v.clone();
            config.minting_state.cache_dir = v.join("minting-state");
        }
    }
}
