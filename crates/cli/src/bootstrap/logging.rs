use ferrous_dnsperf_domain::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries only the report.
/// `RUST_LOG`, when set, takes precedence over `[logging] level`.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Logging initialized at level: {}", config.logging.level);
}
