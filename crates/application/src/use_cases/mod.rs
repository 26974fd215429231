pub mod dispatch;

// Re-export use cases
pub use dispatch::{DispatchEngine, EngineOptions, QuerySlot, QueryState, STALL_THRESHOLD};
pub use run_load_test::{RunLimits, RunLoadTestUseCase};
