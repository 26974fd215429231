use ferrous_dnsperf_application::use_cases::{
    DispatchEngine, EngineOptions, RunLimits, RunLoadTestUseCase,
};
use ferrous_dnsperf_domain::Config;
use ferrous_dnsperf_infrastructure::corpus_loader::CorpusLoader;
use ferrous_dnsperf_infrastructure::dns::HickoryQueryCodec;
use ferrous_dnsperf_infrastructure::events::select_event_system;
use ferrous_dnsperf_infrastructure::network::Socket2Factory;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub type LoadTest = RunLoadTestUseCase<Socket2Factory, HickoryQueryCodec>;

/// Performs every setup step; any failure here aborts before the first query.
pub fn build_load_test(config: &Config, stop: Arc<AtomicBool>) -> anyhow::Result<LoadTest> {
    let corpus_path = config
        .corpus
        .path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("corpus path is required"))?;
    let corpus = Arc::new(CorpusLoader::load(corpus_path)?);

    let server = config.target.socket_addr()?;
    let factory = Socket2Factory::new(server, config.target.transport);
    let codec = HickoryQueryCodec::new(config.load.client_subnet_addr()?);
    let events = select_event_system(config.load.max_descriptors)?;

    let engine = DispatchEngine::new(
        events,
        factory,
        codec,
        corpus,
        EngineOptions {
            concurrency: config.load.concurrency,
            timeout: config.load.timeout(),
            verbose: config.load.verbose,
            seed: config.load.seed,
        },
    );

    let limits = RunLimits {
        max_queries: config.load.query_budget(),
        duration: config.load.run_duration(),
        poll_interval: config.load.poll_interval(),
    };

    Ok(RunLoadTestUseCase::new(engine, limits, stop))
}
