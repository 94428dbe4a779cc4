use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use node::cli::Cli;
use node::config::Config;
use node::{http, logging, Daemon};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), &cli).wrap_err("loading configuration")?;

    tracing::info!(modules = %config.modules, api_addr = %config.api_addr, "starting daemon");

    let daemon = Arc::new(
        Daemon::bootstrap(config.clone()).map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?,
    );

    let router = http::router(Arc::clone(&daemon));
    let listener = tokio::net::TcpListener::bind(&config.api_addr)
        .await
        .wrap_err_with(|| format!("binding API address {}", config.api_addr))?;

    tracing::info!(addr = %config.api_addr, "API listening");
    axum::serve(listener, router)
        .await
        .wrap_err("running API server")?;

    Ok(())
}
