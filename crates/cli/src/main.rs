//! # Ferrous DNSPerf
//!
//! Load generator for DNS servers: keeps a fixed number of queries in flight
//! and reports throughput and response codes.

mod bootstrap;
mod di;
mod report;

use bootstrap::{init_logging, install_stop_handlers, load_config};
use clap::Parser;
use ferrous_dnsperf_domain::{AddressFamily, CliOverrides, Transport};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ferrous-dnsperf")]
#[command(version = "0.1.0")]
#[command(about = "DNS performance testing tool")]
struct Cli {
    /// Config file path (optional)
    #[arg(long)]
    config: Option<String>,

    /// Query corpus: one "DOMAIN QTYPE" per line
    #[arg(short = 'd', long = "datafile")]
    datafile: Option<String>,

    /// Server address to query (default: 127.0.0.1)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Server port (default: 53)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Per-query timeout in milliseconds (default: 3000)
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Stop after sending this many queries (default: 1000)
    #[arg(short = 'Q', long = "max-queries", conflicts_with = "duration")]
    max_queries: Option<u64>,

    /// Run for this many seconds instead of a fixed query count
    #[arg(short = 'l', long)]
    duration: Option<u64>,

    /// Queries kept in flight (default: 100)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Longest single wait for socket readiness, in milliseconds (default: 100)
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// Transport: udp or tcp
    #[arg(short = 'T', long)]
    transport: Option<Transport>,

    /// Address family: inet or inet6
    #[arg(short = 'f', long)]
    family: Option<AddressFamily>,

    /// IPv4 address sent as EDNS0 client subnet
    #[arg(long = "client-subnet")]
    client_subnet: Option<String>,

    /// Seed for picking corpus entries
    #[arg(long)]
    seed: Option<u64>,

    /// Report every response code and timeout
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            corpus_path: self.datafile.clone(),
            server: self.server.clone(),
            port: self.port,
            timeout_ms: self.timeout,
            max_queries: self.max_queries,
            duration_secs: self.duration,
            concurrency: self.concurrency,
            poll_interval_ms: self.interval,
            transport: self.transport,
            family: self.family,
            client_subnet: self.client_subnet.clone(),
            seed: self.seed,
            verbose: self.verbose,
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.overrides())?;
    init_logging(&config);

    let stop = install_stop_handlers();
    let load_test = di::build_load_test(&config, stop).inspect_err(|e| {
        error!(error = %e, "Setup failed");
    })?;

    info!(
        server = %config.target.server,
        port = config.target.port,
        "Sending queries"
    );
    let report = load_test.execute().inspect_err(|e| {
        error!(error = %e, "Load test aborted");
    })?;

    print!("{}", report::format_report(&report, config.load.verbose));
    Ok(())
}
