//! Wires the minting plugin, transaction pool, and wallet into a runnable
//! daemon: config loading, collaborator adapters, and the HTTP surface
//! those subsystems are exposed through.

pub mod chain;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod http;
pub mod logging;

pub use config::{Config, ConfigError};
pub use daemon::Daemon;
