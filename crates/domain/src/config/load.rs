use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

/// Query count used when neither a count nor a duration is configured
pub const DEFAULT_MAX_QUERIES: u64 = 1000;

/// Descriptors kept free of query sockets: stdio, the event backend, the
/// corpus file and log sinks
pub const RESERVED_DESCRIPTORS: usize = 64;

/// Load shape of a run: concurrency, deadlines and budgets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadConfig {
    /// Per-query timeout in milliseconds (default: 3000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Stop once this many queries were sent.
    /// Mutually exclusive with `duration_secs`.
    #[serde(default)]
    pub max_queries: Option<u64>,

    /// Stop after running this many seconds.
    /// Mutually exclusive with `max_queries`.
    #[serde(default)]
    pub duration_secs: Option<u64>,

    /// Number of query slots kept in flight (default: 100)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Upper bound of one readiness wait, in milliseconds (default: 100)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Highest descriptor value the event table tracks (default: 10000)
    #[serde(default = "default_max_descriptors")]
    pub max_descriptors: usize,

    /// Seed for the corpus picker; random when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// IPv4 source address sent in an EDNS0 client-subnet option
    #[serde(default)]
    pub client_subnet: Option<String>,

    /// Report every response RCODE and timeout as it happens
    #[serde(default)]
    pub verbose: bool,
}

impl LoadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Query budget of the run; `None` when a run duration is configured
    pub fn query_budget(&self) -> Option<u64> {
        match self.duration_secs {
            Some(_) => None,
            None => Some(self.max_queries.unwrap_or(DEFAULT_MAX_QUERIES)),
        }
    }

    pub fn run_duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }

    pub fn client_subnet_addr(&self) -> Result<Option<Ipv4Addr>, ConfigError> {
        let Some(raw) = self.client_subnet.as_deref() else {
            return Ok(None);
        };

        match IpAddr::from_str(raw) {
            Ok(IpAddr::V4(addr)) => Ok(Some(addr)),
            Ok(IpAddr::V6(_)) => Err(ConfigError::Validation(format!(
                "Client subnet '{}' must be an IPv4 address",
                raw
            ))),
            Err(e) => Err(ConfigError::Validation(format!(
                "Invalid client subnet '{}': {}",
                raw, e
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queries.is_some() && self.duration_secs.is_some() {
            return Err(ConfigError::Validation(
                "max_queries and duration_secs are mutually exclusive, set only one".to_string(),
            ));
        }
        if self.max_queries == Some(0) {
            return Err(ConfigError::Validation(
                "max_queries must be greater than 0".to_string(),
            ));
        }
        if self.duration_secs == Some(0) {
            return Err(ConfigError::Validation(
                "duration_secs must be greater than 0".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.concurrency.saturating_add(RESERVED_DESCRIPTORS) > self.max_descriptors {
            return Err(ConfigError::Validation(format!(
                "concurrency {} leaves fewer than {} spare descriptors under bound {}",
                self.concurrency, RESERVED_DESCRIPTORS, self.max_descriptors
            )));
        }
        self.client_subnet_addr()?;
        Ok(())
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_queries: None,
            duration_secs: None,
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval_ms(),
            max_descriptors: default_max_descriptors(),
            seed: None,
            client_subnet: None,
            verbose: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_concurrency() -> usize {
    100
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_descriptors() -> usize {
    10_000
}
