use ferrous_dnsperf_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        server = %config.target.server,
        port = config.target.port,
        transport = %config.target.transport,
        concurrency = config.load.concurrency,
        "Configuration loaded"
    );

    Ok(config)
}
