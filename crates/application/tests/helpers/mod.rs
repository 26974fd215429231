#![allow(dead_code)]

pub mod fake_codec;
pub mod fake_event_system;
pub mod fake_sockets;

pub use fake_codec::FakeCodec;
pub use fake_event_system::FakeEventSystem;
pub use fake_sockets::{FakeSocketFactory, SendStep, SocketRecord};
