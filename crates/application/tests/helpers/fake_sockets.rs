use ferrous_dnsperf_application::ports::{OpenedSocket, QuerySocket, SocketFactory};
use ferrous_dnsperf_domain::{DomainError, Transport};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::os::fd::RawFd;
use std::rc::Rc;

const FIRST_FD: RawFd = 100;

/// Outcome of one `send` call
#[derive(Debug, Clone, Copy)]
pub enum SendStep {
    Accept,
    Partial(usize),
    WouldBlock,
    Fail,
}

/// Shared view of one socket the factory handed out.
pub struct SocketRecord {
    pub fd: RawFd,
    sends: RefCell<VecDeque<SendStep>>,
    recvs: RefCell<VecDeque<io::Result<Vec<u8>>>>,
    connect_error: Cell<Option<io::ErrorKind>>,
    written: RefCell<Vec<u8>>,
    closed: Cell<bool>,
}

impl SocketRecord {
    fn new(fd: RawFd) -> Self {
        Self {
            fd,
            sends: RefCell::new(VecDeque::new()),
            recvs: RefCell::new(VecDeque::new()),
            connect_error: Cell::new(None),
            written: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        }
    }

    pub fn queue_send(&self, step: SendStep) {
        self.sends.borrow_mut().push_back(step);
    }

    pub fn queue_recv(&self, data: &[u8]) {
        self.recvs.borrow_mut().push_back(Ok(data.to_vec()));
    }

    pub fn queue_recv_error(&self, kind: io::ErrorKind) {
        self.recvs.borrow_mut().push_back(Err(kind.into()));
    }

    pub fn fail_connect(&self, kind: io::ErrorKind) {
        self.connect_error.set(Some(kind));
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

pub struct FakeSocket {
    record: Rc<SocketRecord>,
}

impl Drop for FakeSocket {
    fn drop(&mut self) {
        self.record.closed.set(true);
    }
}

impl QuerySocket for FakeSocket {
    fn raw_fd(&self) -> RawFd {
        self.record.fd
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        let step = self
            .record
            .sends
            .borrow_mut()
            .pop_front()
            .unwrap_or(SendStep::Accept);

        match step {
            SendStep::Accept => {
                self.record.written.borrow_mut().extend_from_slice(buf);
                Ok(buf.len())
            }
            SendStep::Partial(n) => {
                let n = n.min(buf.len());
                self.record.written.borrow_mut().extend_from_slice(&buf[..n]);
                Ok(n)
            }
            SendStep::WouldBlock => Err(io::ErrorKind::WouldBlock.into()),
            SendStep::Fail => Err(io::ErrorKind::ConnectionRefused.into()),
        }
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self.record.recvs.borrow_mut().pop_front() {
            Some(Ok(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn connect_result(&self) -> io::Result<()> {
        match self.record.connect_error.get() {
            Some(kind) => Err(kind.into()),
            None => Ok(()),
        }
    }
}

struct FactoryState {
    transport: Transport,
    opened: RefCell<Vec<Rc<SocketRecord>>>,
    first_sends: RefCell<VecDeque<SendStep>>,
    fail_open: Cell<bool>,
    open_attempts: Cell<usize>,
    failing_attempts: RefCell<Vec<usize>>,
}

/// Hands out scripted sockets with ascending descriptors starting at 100.
/// UDP sockets open connected; TCP sockets start out connecting.
#[derive(Clone)]
pub struct FakeSocketFactory {
    state: Rc<FactoryState>,
}

impl FakeSocketFactory {
    pub fn new(transport: Transport) -> Self {
        Self {
            state: Rc::new(FactoryState {
                transport,
                opened: RefCell::new(Vec::new()),
                first_sends: RefCell::new(VecDeque::new()),
                fail_open: Cell::new(false),
                open_attempts: Cell::new(0),
                failing_attempts: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn udp() -> Self {
        Self::new(Transport::Udp)
    }

    pub fn tcp() -> Self {
        Self::new(Transport::Tcp)
    }

    /// Scripts the first send of the next socket to be opened
    pub fn queue_first_send(&self, step: SendStep) {
        self.state.first_sends.borrow_mut().push_back(step);
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state.fail_open.set(fail);
    }

    /// Makes the `attempt`-th call to `open` (1-based) fail
    pub fn fail_open_attempt(&self, attempt: usize) {
        self.state.failing_attempts.borrow_mut().push(attempt);
    }

    pub fn open_attempts(&self) -> usize {
        self.state.open_attempts.get()
    }

    pub fn open_count(&self) -> usize {
        self.state.opened.borrow().len()
    }

    pub fn socket(&self, index: usize) -> Rc<SocketRecord> {
        Rc::clone(&self.state.opened.borrow()[index])
    }

    pub fn socket_by_fd(&self, fd: RawFd) -> Rc<SocketRecord> {
        self.socket((fd - FIRST_FD) as usize)
    }
}

impl SocketFactory for FakeSocketFactory {
    type Socket = FakeSocket;

    fn open(&self) -> Result<OpenedSocket<FakeSocket>, DomainError> {
        let attempt = self.state.open_attempts.get() + 1;
        self.state.open_attempts.set(attempt);
        if self.state.fail_open.get() || self.state.failing_attempts.borrow().contains(&attempt) {
            return Err(DomainError::SocketError(
                "Too many open files".to_string(),
            ));
        }

        let mut opened = self.state.opened.borrow_mut();
        let record = Rc::new(SocketRecord::new(FIRST_FD + opened.len() as RawFd));
        if let Some(step) = self.state.first_sends.borrow_mut().pop_front() {
            record.queue_send(step);
        }
        opened.push(Rc::clone(&record));

        Ok(OpenedSocket {
            socket: FakeSocket { record },
            connected: self.state.transport == Transport::Udp,
        })
    }

    fn transport(&self) -> Transport {
        self.state.transport
    }
}
