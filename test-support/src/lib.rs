//! Shared test initialization, called at the top of any `#[test]` that
//! exercises a subsystem's logging paths.

use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs a `tracing` subscriber for the test process, once. Safe to
/// call from every test in every crate; only the first call takes effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
