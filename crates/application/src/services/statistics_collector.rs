use ferrous_dnsperf_domain::{RcodeClass, RunReport, RunStatistics, StopReason};
use std::time::{Duration, Instant};

/// Counts sent queries and classified responses for one run.
///
/// Owned by the dispatch engine; single-threaded, so plain integers suffice.
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    stats: RunStatistics,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one query whose first send attempt succeeded
    pub fn record_sent(&mut self) {
        self.stats.sent += 1;
    }

    /// Counts a matched response in its RCODE bucket
    pub fn record_outcome(&mut self, class: RcodeClass) {
        self.stats.received += 1;
        self.stats.by_rcode[class.index()] += 1;
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn sent(&self) -> u64 {
        self.stats.sent
    }

    pub fn received(&self) -> u64 {
        self.stats.received
    }

    pub fn finalize(
        &self,
        start: Instant,
        end: Instant,
        stop_reason: Option<StopReason>,
    ) -> RunReport {
        build_report(
            self.stats.clone(),
            end.saturating_duration_since(start),
            stop_reason,
        )
    }
}

/// Derives completion percentage and QPS; both are 0 when nothing was sent
/// (or no time elapsed) instead of dividing by zero.
pub fn build_report(
    stats: RunStatistics,
    elapsed: Duration,
    stop_reason: Option<StopReason>,
) -> RunReport {
    let elapsed_secs = elapsed.as_secs_f64();

    let completion_percent = if stats.sent == 0 {
        0.0
    } else {
        stats.received as f64 * 100.0 / stats.sent as f64
    };

    let queries_per_second = if stats.sent == 0 || elapsed_secs == 0.0 {
        0.0
    } else {
        stats.sent as f64 / elapsed_secs
    };

    RunReport {
        stats,
        elapsed,
        completion_percent,
        queries_per_second,
        stop_reason,
    }
}
