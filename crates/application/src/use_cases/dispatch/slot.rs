use crate::ports::QuerySocket;
use std::os::fd::RawFd;
use std::time::Instant;

/// Size of a slot's receive buffer; only the response header is inspected.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Typical wire size of a query, used to pre-size send buffers
const SEND_BUFFER_CAPACITY: usize = 512;

/// Lifecycle of one query attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Unused,
    /// Waiting for an asynchronous (TCP) connect to finish
    Connecting,
    /// Part of the query is still to be written
    Sending,
    /// Query written, waiting for the response
    Reading,
}

impl QueryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryState::Unused => "unused",
            QueryState::Connecting => "connecting",
            QueryState::Sending => "sending",
            QueryState::Reading => "reading",
        }
    }
}

/// One reusable entry of the fixed-size query pool.
///
/// Either idle (`Unused`, no socket, no ID) or owning exactly one open
/// socket. Buffers are allocated once and reused for every query the slot
/// carries.
pub struct QuerySlot<S> {
    pub(crate) state: QueryState,
    pub(crate) transaction_id: Option<u16>,
    pub(crate) socket: Option<S>,
    pub(crate) send_buf: Vec<u8>,
    pub(crate) sent_bytes: usize,
    pub(crate) recv_buf: Box<[u8]>,
    pub(crate) recv_bytes: usize,
    pub(crate) deadline: Option<Instant>,
    pub(crate) entry: Option<usize>,
}

impl<S: QuerySocket> QuerySlot<S> {
    pub fn new() -> Self {
        Self {
            state: QueryState::Unused,
            transaction_id: None,
            socket: None,
            send_buf: Vec::with_capacity(SEND_BUFFER_CAPACITY),
            sent_bytes: 0,
            recv_buf: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(),
            recv_bytes: 0,
            deadline: None,
            entry: None,
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == QueryState::Unused
    }

    pub fn transaction_id(&self) -> Option<u16> {
        self.transaction_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Index of the corpus entry this slot is exercising
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    pub fn fd(&self) -> Option<RawFd> {
        self.socket.as_ref().map(QuerySocket::raw_fd)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        !self.is_idle() && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Arms the slot for a new query on `socket`.
    pub(crate) fn arm(&mut self, socket: S, transaction_id: u16, entry: usize, deadline: Instant) {
        self.socket = Some(socket);
        self.transaction_id = Some(transaction_id);
        self.entry = Some(entry);
        self.deadline = Some(deadline);
        self.sent_bytes = 0;
        self.recv_bytes = 0;
        self.state = QueryState::Connecting;
    }

    /// Closes the socket (by dropping it) and returns the slot to `Unused`.
    pub(crate) fn release(&mut self) {
        self.socket = None;
        self.transaction_id = None;
        self.deadline = None;
        self.entry = None;
        self.sent_bytes = 0;
        self.recv_bytes = 0;
        self.state = QueryState::Unused;
    }
}

impl<S: QuerySocket> Default for QuerySlot<S> {
    fn default() -> Self {
        Self::new()
    }
}
