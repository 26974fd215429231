//! Ferrous DNSPerf Infrastructure Layer
pub mod corpus_loader;
pub mod dns;
pub mod events;
pub mod network;
