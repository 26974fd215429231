//! Shared fixtures for the end-to-end flows.

pub mod fixtures;
pub mod mock_server;

pub use fixtures::LoadTestBuilder;
pub use mock_server::{MockDnsServer, ServerBehavior};
