use tracing_subscriber::EnvFilter;

/// Installs a structured, env-filterable subscriber. `RUST_LOG` overrides
/// the default `info` level, e.g. `RUST_LOG=txpool=debug,wallet=trace`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}
