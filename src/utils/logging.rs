use std::sync::LazyLock;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Enables console diagnostics. Output goes to stderr so it doesn't fight
/// with the status line on stdout. `RUST_LOG` overrides the default level
/// when no explicit level is given.
pub fn enable_diagnostics(log_level: Option<LevelFilter>) {
    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_writer(std::io::stderr)
        .init();
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
