use super::slot::{QuerySlot, QueryState};
use crate::ports::{
    Direction, EventSystem, OpenedSocket, QueryCodec, QuerySocket, ReadinessHandler,
    SocketFactory, Token, RESPONSE_HEADER_LEN,
};
use crate::services::StatisticsCollector;
use ferrous_dnsperf_domain::{Corpus, DomainError, RcodeClass, RunStatistics, Transport};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Length prefix carried by DNS messages on stream transports
const STREAM_LENGTH_PREFIX: usize = 2;

/// Consecutive queries that may fail to start before the engine reports
/// itself stalled
pub const STALL_THRESHOLD: u32 = 1000;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Number of query slots (concurrency width)
    pub concurrency: usize,
    /// Per-query deadline, measured from the moment the slot is filled
    pub timeout: Duration,
    /// Log every matched response and every timeout
    pub verbose: bool,
    /// Seed for the corpus picker
    pub seed: Option<u64>,
}

/// Drives a fixed pool of query slots through
/// `Unused → Connecting → Sending → Reading → Unused`.
///
/// The engine owns the event system, the pool and the statistics; all of
/// them are touched from one thread only. Deadlines are enforced by
/// [`reap_timed_out`](Self::reap_timed_out), independently of readiness.
pub struct DispatchEngine<F: SocketFactory, C: QueryCodec> {
    events: Box<dyn EventSystem>,
    factory: F,
    codec: C,
    corpus: Arc<Corpus>,
    slots: Vec<QuerySlot<F::Socket>>,
    stats: StatisticsCollector,
    rng: fastrand::Rng,
    timeout: Duration,
    verbose: bool,
    stream: bool,
    query_budget: Option<u64>,
    failed_starts: u32,
}

impl<F: SocketFactory, C: QueryCodec> DispatchEngine<F, C> {
    /// Allocates the slot pool. No query objects are allocated after this.
    pub fn new(
        events: Box<dyn EventSystem>,
        factory: F,
        codec: C,
        corpus: Arc<Corpus>,
        options: EngineOptions,
    ) -> Self {
        let slots = (0..options.concurrency).map(|_| QuerySlot::new()).collect();
        let rng = match options.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let stream = factory.transport() == Transport::Tcp;

        debug!(
            slots = options.concurrency,
            backend = events.backend_name(),
            transport = %factory.transport(),
            "Query pool prepared"
        );

        Self {
            events,
            factory,
            codec,
            corpus,
            slots,
            stats: StatisticsCollector::new(),
            rng,
            timeout: options.timeout,
            verbose: options.verbose,
            stream,
            query_budget: None,
            failed_starts: 0,
        }
    }

    /// Caps the number of queries the engine will send.
    pub fn with_query_budget(mut self, budget: Option<u64>) -> Self {
        self.query_budget = budget;
        self
    }

    /// Starts a query in every idle slot.
    ///
    /// Each query picks a corpus entry uniformly at random, opens a socket,
    /// encodes the packet and attempts an immediate send. Per-query failures
    /// return the slot to `Unused`. Failing to open a socket, or getting one
    /// the event system cannot track, is returned as an error when no query
    /// is in flight at all; otherwise filling resumes on the next call.
    pub fn fill_idle_slots(&mut self, now: Instant) -> Result<usize, DomainError> {
        if self.corpus.is_empty() {
            return Err(DomainError::EmptyCorpus);
        }
        let mut filled = 0;
        let mut connecting = self.connecting();

        for index in 0..self.slots.len() {
            if !self.slots[index].is_idle() {
                continue;
            }
            if self.reaches_budget(connecting) {
                break;
            }

            let opened = match self.open_trackable() {
                Ok(opened) => opened,
                Err(e) => {
                    self.failed_starts += 1;
                    if self.in_flight() == 0 {
                        return Err(e);
                    }
                    warn!(slot = index, error = %e, "Failed to open query socket");
                    break;
                }
            };

            let entry_index = self.rng.usize(..self.corpus.len());
            let slot = &mut self.slots[index];

            let encoded = match self.corpus.get(entry_index) {
                Some(entry) => self.codec.encode(entry, &mut slot.send_buf),
                None => Err(DomainError::EncodeFailed(format!(
                    "corpus entry {entry_index} out of range"
                ))),
            };
            let transaction_id = match encoded.and_then(|id| {
                if self.stream {
                    frame_for_stream(&mut slot.send_buf)?;
                }
                Ok(id)
            }) {
                Ok(id) => id,
                Err(e) => {
                    debug!(slot = index, error = %e, "Failed to encode query");
                    self.failed_starts += 1;
                    continue;
                }
            };

            slot.arm(opened.socket, transaction_id, entry_index, now + self.timeout);
            filled += 1;

            if opened.connected {
                begin_query(
                    slot,
                    index,
                    self.events.as_mut(),
                    &mut self.stats,
                    &mut self.failed_starts,
                );
            } else if let Some(fd) = slot.fd() {
                match self.events.set_interest(fd, Direction::Write, index) {
                    Ok(()) => connecting += 1,
                    Err(e) => {
                        debug!(slot = index, error = %e, "Failed to watch connect");
                        abandon(slot, self.events.as_mut());
                        self.failed_starts += 1;
                    }
                }
            }
        }

        Ok(filled)
    }

    /// Opens a socket and rejects it before anything is written if its
    /// descriptor is past the event table bound.
    fn open_trackable(&self) -> Result<OpenedSocket<F::Socket>, DomainError> {
        let opened = self.factory.open()?;
        let fd = opened.socket.raw_fd();
        if !self.events.can_track(fd) {
            return Err(DomainError::DescriptorOutOfRange {
                fd,
                limit: self.events.capacity(),
            });
        }
        Ok(opened)
    }

    /// Waits up to `timeout` for readiness and runs the send/receive
    /// callbacks for every ready slot.
    pub fn dispatch(&mut self, timeout: Duration) -> Result<usize, DomainError> {
        let mut callbacks = SlotCallbacks {
            slots: &mut self.slots,
            codec: &self.codec,
            stats: &mut self.stats,
            failed_starts: &mut self.failed_starts,
            stream: self.stream,
            verbose: self.verbose,
        };
        self.events.dispatch(timeout, &mut callbacks)
    }

    /// Abandons every in-flight query whose deadline has passed.
    ///
    /// Timed-out queries are never counted as received.
    pub fn reap_timed_out(&mut self, now: Instant) -> usize {
        let mut reaped = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.is_expired(now) {
                continue;
            }
            if self.verbose {
                info!(
                    slot = index,
                    id = ?slot.transaction_id(),
                    state = slot.state().as_str(),
                    "Query timed out"
                );
            }
            abandon(slot, self.events.as_mut());
            reaped += 1;
        }

        reaped
    }

    /// Clears interest for and closes every in-flight query.
    pub fn close_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.is_idle()) {
            abandon(slot, self.events.as_mut());
        }
    }

    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_idle()).count()
    }

    /// True once sent queries plus connects that will send have reached the
    /// query budget. With nothing in flight this is `sent >= budget`.
    pub fn budget_exhausted(&self) -> bool {
        self.reaches_budget(self.connecting())
    }

    fn reaches_budget(&self, connecting: u64) -> bool {
        self.query_budget
            .is_some_and(|budget| self.stats.sent() + connecting >= budget)
    }

    fn connecting(&self) -> u64 {
        self.slots
            .iter()
            .filter(|slot| slot.state == QueryState::Connecting)
            .count() as u64
    }

    /// Queries that failed to start since the last successful send
    pub fn failed_starts(&self) -> u32 {
        self.failed_starts
    }

    /// True when nothing is in flight and the last [`STALL_THRESHOLD`]
    /// attempts to start a query all failed
    pub fn is_stalled(&self) -> bool {
        self.failed_starts >= STALL_THRESHOLD && self.in_flight() == 0
    }

    pub fn statistics(&self) -> &RunStatistics {
        self.stats.stats()
    }

    pub fn collector(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn slots(&self) -> &[QuerySlot<F::Socket>] {
        &self.slots
    }

    pub fn backend_name(&self) -> &'static str {
        self.events.backend_name()
    }
}

/// Readiness callbacks; borrows the parts of the engine the event system
/// does not own.
struct SlotCallbacks<'a, S, C> {
    slots: &'a mut [QuerySlot<S>],
    codec: &'a C,
    stats: &'a mut StatisticsCollector,
    failed_starts: &'a mut u32,
    stream: bool,
    verbose: bool,
}

impl<S: QuerySocket, C: QueryCodec> ReadinessHandler for SlotCallbacks<'_, S, C> {
    fn on_writable(&mut self, events: &mut dyn EventSystem, token: Token) {
        let Some(slot) = self.slots.get_mut(token) else {
            return;
        };

        match slot.state {
            QueryState::Connecting => {
                match slot.socket.as_ref().map(QuerySocket::connect_result) {
                    Some(Ok(())) => {
                        begin_query(slot, token, events, self.stats, self.failed_starts)
                    }
                    Some(Err(e)) => {
                        debug!(slot = token, error = %e, "Connect failed, abandoning query");
                        abandon(slot, events);
                        *self.failed_starts += 1;
                    }
                    None => {
                        abandon(slot, events);
                        *self.failed_starts += 1;
                    }
                }
            }
            QueryState::Sending => {
                if let Err(e) = drive_send(slot, token, events) {
                    debug!(slot = token, error = %e, "Send failed, abandoning query");
                    abandon(slot, events);
                }
            }
            QueryState::Reading | QueryState::Unused => {}
        }
    }

    fn on_readable(&mut self, events: &mut dyn EventSystem, token: Token) {
        let Some(slot) = self.slots.get_mut(token) else {
            return;
        };
        if slot.state != QueryState::Reading {
            return;
        }
        let Some(socket) = slot.socket.as_ref() else {
            abandon(slot, events);
            return;
        };

        let fd = socket.raw_fd();
        let received = socket.recv(&mut slot.recv_buf[slot.recv_bytes..]);

        let n = match received {
            Ok(0) if self.stream => {
                debug!(slot = token, "Connection closed before response");
                abandon(slot, events);
                return;
            }
            Ok(n) => n,
            Err(e) if is_transient(&e) => {
                if let Err(e) = events.set_interest(fd, Direction::Read, token) {
                    debug!(slot = token, error = %e, "Failed to re-arm read interest");
                    abandon(slot, events);
                }
                return;
            }
            Err(e) => {
                debug!(slot = token, error = %e, "Receive failed, abandoning query");
                abandon(slot, events);
                return;
            }
        };

        slot.recv_bytes += n;

        let offset = if self.stream { STREAM_LENGTH_PREFIX } else { 0 };
        if self.stream && slot.recv_bytes < offset + RESPONSE_HEADER_LEN {
            if let Err(e) = events.set_interest(fd, Direction::Read, token) {
                debug!(slot = token, error = %e, "Failed to re-arm read interest");
                abandon(slot, events);
            }
            return;
        }

        let header = self.codec.decode(&slot.recv_buf[offset..slot.recv_bytes]);
        let expected = slot.transaction_id;
        abandon(slot, events);

        match header {
            Some(header) if Some(header.id) == expected => {
                let class = RcodeClass::from_rcode(header.rcode);
                self.stats.record_outcome(class);
                if self.verbose {
                    info!(slot = token, id = header.id, rcode = %class, "Response received");
                }
            }
            // A late answer for a reused slot looks exactly like this.
            Some(header) => {
                debug!(
                    slot = token,
                    id = header.id,
                    expected = ?expected,
                    "Discarding response with mismatched transaction ID"
                );
            }
            None => debug!(slot = token, bytes = n, "Discarding truncated response"),
        }
    }
}

/// First send attempt of a query; counts it as sent unless it fails outright.
fn begin_query<S: QuerySocket>(
    slot: &mut QuerySlot<S>,
    token: Token,
    events: &mut dyn EventSystem,
    stats: &mut StatisticsCollector,
    failed_starts: &mut u32,
) {
    match drive_send(slot, token, events) {
        Ok(()) => {
            stats.record_sent();
            *failed_starts = 0;
        }
        Err(e) => {
            debug!(slot = token, error = %e, "Send failed, abandoning query");
            abandon(slot, events);
            *failed_starts += 1;
        }
    }
}

/// Writes as much of the pending query as the socket accepts, resuming from
/// the stored offset, and registers the interest the resulting state needs.
fn drive_send<S: QuerySocket>(
    slot: &mut QuerySlot<S>,
    token: Token,
    events: &mut dyn EventSystem,
) -> Result<(), DomainError> {
    let Some(socket) = slot.socket.as_ref() else {
        return Err(DomainError::SocketError("slot has no socket".to_string()));
    };
    let fd = socket.raw_fd();

    match socket.send(&slot.send_buf[slot.sent_bytes..]) {
        Ok(n) => {
            slot.sent_bytes += n;
            if slot.sent_bytes >= slot.send_buf.len() {
                slot.state = QueryState::Reading;
                events.set_interest(fd, Direction::Read, token)
            } else {
                slot.state = QueryState::Sending;
                events.set_interest(fd, Direction::Write, token)
            }
        }
        Err(e) if is_transient(&e) => {
            slot.state = QueryState::Sending;
            events.set_interest(fd, Direction::Write, token)
        }
        Err(e) => Err(DomainError::SocketError(format!("send failed: {e}"))),
    }
}

/// Drops any remaining interest, closes the socket and frees the slot.
fn abandon<S: QuerySocket>(slot: &mut QuerySlot<S>, events: &mut dyn EventSystem) {
    if let Some(fd) = slot.fd() {
        for direction in [Direction::Write, Direction::Read] {
            if !events.is_interested(fd, direction) {
                continue;
            }
            if let Err(e) = events.clear_interest(fd, direction) {
                warn!(fd, direction = direction.as_str(), error = %e, "Failed to clear interest");
            }
        }
    }
    slot.release();
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Prepends the two-byte length field DNS uses on stream transports.
fn frame_for_stream(buf: &mut Vec<u8>) -> Result<(), DomainError> {
    let len = u16::try_from(buf.len()).map_err(|_| {
        DomainError::EncodeFailed(format!("query of {} bytes too large for TCP", buf.len()))
    })?;
    buf.splice(0..0, len.to_be_bytes());
    Ok(())
}
