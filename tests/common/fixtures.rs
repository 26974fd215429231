use ferrous_dnsperf_application::use_cases::{
    DispatchEngine, EngineOptions, RunLimits, RunLoadTestUseCase,
};
use ferrous_dnsperf_domain::{Corpus, DomainError, RunReport, Transport};
use ferrous_dnsperf_infrastructure::dns::HickoryQueryCodec;
use ferrous_dnsperf_infrastructure::events::select_event_system;
use ferrous_dnsperf_infrastructure::network::Socket2Factory;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Plain-data description of a run; the engine itself is built on the
/// thread that executes it.
#[derive(Debug, Clone)]
pub struct LoadTestBuilder {
    pub server: SocketAddr,
    pub transport: Transport,
    pub corpus: String,
    pub concurrency: usize,
    pub timeout: Duration,
    pub max_queries: Option<u64>,
    pub duration: Option<Duration>,
    pub client_subnet: Option<Ipv4Addr>,
    pub stop: Arc<AtomicBool>,
}

impl LoadTestBuilder {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            transport: Transport::Udp,
            corpus: "a.test A\n".to_string(),
            concurrency: 1,
            timeout: Duration::from_millis(100),
            max_queries: Some(1),
            duration: None,
            client_subnet: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn corpus(mut self, corpus: &str) -> Self {
        self.corpus = corpus.to_string();
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_queries(mut self, max_queries: u64) -> Self {
        self.max_queries = Some(max_queries);
        self.duration = None;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self.max_queries = None;
        self
    }

    pub fn client_subnet(mut self, addr: Ipv4Addr) -> Self {
        self.client_subnet = Some(addr);
        self
    }

    pub fn run(self) -> Result<RunReport, DomainError> {
        let corpus = Arc::new(Corpus::parse(&self.corpus)?);
        let events = select_event_system(10_000)?;
        let engine = DispatchEngine::new(
            events,
            Socket2Factory::new(self.server, self.transport),
            HickoryQueryCodec::new(self.client_subnet),
            corpus,
            EngineOptions {
                concurrency: self.concurrency,
                timeout: self.timeout,
                verbose: true,
                seed: Some(42),
            },
        );
        let limits = RunLimits {
            max_queries: self.max_queries,
            duration: self.duration,
            poll_interval: Duration::from_millis(20),
        };

        RunLoadTestUseCase::new(engine, limits, self.stop).execute()
    }

    /// Runs on the blocking pool so mock servers keep being polled.
    pub async fn run_blocking(self) -> Result<RunReport, DomainError> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?
    }
}
