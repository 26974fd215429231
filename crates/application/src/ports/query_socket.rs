use ferrous_dnsperf_domain::{DomainError, Transport};
use std::io;
use std::os::fd::RawFd;

/// A non-blocking socket connected to the server under test.
///
/// Dropping the socket closes it.
pub trait QuerySocket {
    fn raw_fd(&self) -> RawFd;

    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Outcome of an asynchronous connect, read once the socket reports
    /// write-readiness.
    fn connect_result(&self) -> io::Result<()>;
}

/// Freshly opened socket plus whether its connection is already established.
pub struct OpenedSocket<S> {
    pub socket: S,
    pub connected: bool,
}

/// Opens one socket per query.
pub trait SocketFactory {
    type Socket: QuerySocket;

    fn open(&self) -> Result<OpenedSocket<Self::Socket>, DomainError>;

    fn transport(&self) -> Transport;
}
