//! Ferrous DNSPerf Domain Layer
pub mod config;
pub mod corpus;
pub mod dns_record;
pub mod errors;
pub mod rcode;
pub mod run_stats;
pub mod validators;

pub use config::{AddressFamily, CliOverrides, Config, ConfigError, Transport};
pub use corpus::{Corpus, CorpusEntry};
pub use dns_record::RecordType;
pub use errors::DomainError;
pub use rcode::RcodeClass;
pub use run_stats::{RunReport, RunStatistics, StopReason};
