use ferrous_dnsperf_application::ports::{OpenedSocket, QuerySocket, SocketFactory};
use ferrous_dnsperf_domain::{DomainError, Transport};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, RawFd};
use tracing::warn;

/// Requested SO_RCVBUF/SO_SNDBUF size
pub const SOCKET_BUFFER_SIZE: usize = 8 * 1024;

/// Non-blocking socket connected to the server under test.
pub struct DnsSocket {
    inner: Socket,
}

impl DnsSocket {
    pub fn socket(&self) -> &Socket {
        &self.inner
    }
}

impl QuerySocket for DnsSocket {
    fn raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.send(buf)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.inner).read(buf)
    }

    fn connect_result(&self) -> io::Result<()> {
        match self.inner.take_error()? {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Opens one connected, non-blocking socket per query.
pub struct Socket2Factory {
    server: SocketAddr,
    server_addr: SockAddr,
    transport: Transport,
}

impl Socket2Factory {
    pub fn new(server: SocketAddr, transport: Transport) -> Self {
        Self {
            server,
            server_addr: SockAddr::from(server),
            transport,
        }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    fn create_socket(&self) -> Result<Socket, DomainError> {
        let (socket_type, protocol) = match self.transport {
            Transport::Udp => (Type::DGRAM, Protocol::UDP),
            Transport::Tcp => (Type::STREAM, Protocol::TCP),
        };

        let socket = Socket::new(Domain::for_address(self.server), socket_type, Some(protocol))
            .map_err(|e| {
                DomainError::SocketError(format!(
                    "Failed to create {} socket: {}",
                    self.transport, e
                ))
            })?;

        // Buffer sizes are best effort
        if let Err(e) = socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE) {
            warn!(error = %e, "Failed to set SO_RCVBUF");
        }
        if let Err(e) = socket.set_send_buffer_size(SOCKET_BUFFER_SIZE) {
            warn!(error = %e, "Failed to set SO_SNDBUF");
        }

        socket.set_nonblocking(true).map_err(|e| {
            DomainError::SocketError(format!("Failed to set O_NONBLOCK: {}", e))
        })?;

        Ok(socket)
    }
}

impl SocketFactory for Socket2Factory {
    type Socket = DnsSocket;

    fn open(&self) -> Result<OpenedSocket<DnsSocket>, DomainError> {
        let socket = self.create_socket()?;

        // EINPROGRESS is expected for non-blocking stream sockets
        let connected = match socket.connect(&self.server_addr) {
            Ok(()) => true,
            Err(ref e)
                if e.raw_os_error() == Some(libc::EINPROGRESS)
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                false
            }
            Err(e) => {
                return Err(DomainError::SocketError(format!(
                    "Failed to connect {} socket to {}: {}",
                    self.transport, self.server, e
                )));
            }
        };

        Ok(OpenedSocket {
            socket: DnsSocket { inner: socket },
            connected,
        })
    }

    fn transport(&self) -> Transport {
        self.transport
    }
}
