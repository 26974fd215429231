use super::{AddressFamily, ConfigError, CorpusConfig, LoadConfig, LoggingConfig, TargetConfig, Transport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration: config file values with CLI overrides applied
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub load: LoadConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line; each `Some` replaces the file value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub corpus_path: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
    pub max_queries: Option<u64>,
    pub duration_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub poll_interval_ms: Option<u64>,
    pub transport: Option<Transport>,
    pub family: Option<AddressFamily>,
    pub client_subnet: Option<String>,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub log_level: Option<String>,
}

impl Config {
    /// Loads the config file (when given) and applies CLI overrides on top.
    pub fn load(config_path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(path) = overrides.corpus_path {
            self.corpus.path = Some(path);
        }
        if let Some(server) = overrides.server {
            self.target.server = server;
        }
        if let Some(port) = overrides.port {
            self.target.port = port;
        }
        if let Some(transport) = overrides.transport {
            self.target.transport = transport;
        }
        if let Some(family) = overrides.family {
            self.target.family = family;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.load.timeout_ms = timeout_ms;
        }
        // A budget given on the command line replaces whichever budget the file chose.
        if let Some(max_queries) = overrides.max_queries {
            self.load.max_queries = Some(max_queries);
            self.load.duration_secs = None;
        }
        if let Some(duration_secs) = overrides.duration_secs {
            self.load.duration_secs = Some(duration_secs);
            self.load.max_queries = None;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.load.concurrency = concurrency;
        }
        if let Some(poll_interval_ms) = overrides.poll_interval_ms {
            self.load.poll_interval_ms = poll_interval_ms;
        }
        if let Some(client_subnet) = overrides.client_subnet {
            self.load.client_subnet = Some(client_subnet);
        }
        if let Some(seed) = overrides.seed {
            self.load.seed = Some(seed);
        }
        if overrides.verbose {
            self.load.verbose = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.corpus.path.as_deref() {
            None | Some("") => {
                return Err(ConfigError::Validation(
                    "corpus path is required".to_string(),
                ))
            }
            Some(_) => {}
        }
        self.target.socket_addr()?;
        self.load.validate()?;
        self.logging.validate()
    }
}
