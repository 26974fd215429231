use crate::RcodeClass;
use std::fmt;
use std::time::Duration;

/// Counters for one load run.
///
/// Mutated only from the dispatch engine's thread; counters only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub sent: u64,
    pub received: u64,
    pub by_rcode: [u64; RcodeClass::COUNT],
}

impl RunStatistics {
    pub fn rcode_count(&self, class: RcodeClass) -> u64 {
        self.by_rcode[class.index()]
    }
}

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueryBudget,
    TimeBudget,
    Interrupted,
    /// Every recent attempt to start a query failed and none is in flight
    Stalled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::QueryBudget => "query budget reached",
            StopReason::TimeBudget => "time budget reached",
            StopReason::Interrupted => "interrupted",
            StopReason::Stalled => "stalled, no query could be started",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final figures of a run, derived from [`RunStatistics`] and the run's
/// start/end timestamps.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStatistics,
    pub elapsed: Duration,
    /// `received * 100 / sent`, 0 when nothing was sent
    pub completion_percent: f64,
    /// `sent / elapsed_secs`, 0 when nothing was sent or no time elapsed
    pub queries_per_second: f64,
    pub stop_reason: Option<StopReason>,
}

impl RunReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
