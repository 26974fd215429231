pub mod socket_factory;

pub use socket_factory::{DnsSocket, Socket2Factory, SOCKET_BUFFER_SIZE};
