//! Configuration module for Ferrous DNSPerf
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `target`: Name server address, port, transport and family
//! - `load`: Concurrency, timeouts, budgets and EDNS client subnet
//! - `corpus`: Query data file location
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod corpus;
pub mod errors;
pub mod load;
pub mod logging;
pub mod root;
pub mod target;

pub use corpus::CorpusConfig;
pub use errors::ConfigError;
pub use load::{LoadConfig, DEFAULT_MAX_QUERIES, RESERVED_DESCRIPTORS};
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use target::{AddressFamily, TargetConfig, Transport};
