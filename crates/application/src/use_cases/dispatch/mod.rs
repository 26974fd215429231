pub mod engine;
pub mod slot;

pub use engine::{DispatchEngine, EngineOptions, STALL_THRESHOLD};
pub use slot::{QuerySlot, QueryState, RECV_BUFFER_SIZE};
