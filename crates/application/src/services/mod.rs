pub mod statistics_collector;

pub use statistics_collector::{build_report, StatisticsCollector};
