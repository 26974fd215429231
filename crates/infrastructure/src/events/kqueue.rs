//! Change-list backend (BSD/macOS kqueue).
//!
//! Interest deltas are submitted immediately, one `kevent` change per call;
//! `dispatch` only collects fired events.

use super::fd_table::FdTable;
use ferrous_dnsperf_application::ports::{Direction, EventSystem, ReadinessHandler, Token};
use ferrous_dnsperf_domain::DomainError;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;
use std::time::Duration;
use tracing::warn;

const MAX_EVENTS_PER_WAIT: usize = 1024;

pub struct KqueueEventSystem {
    kq: OwnedFd,
    table: FdTable,
    events: Vec<libc::kevent>,
    fired: Vec<Fired>,
}

/// Readiness of one descriptor within a batch
#[derive(Clone, Copy)]
struct Fired {
    fd: RawFd,
    writable: bool,
    readable: bool,
}

impl KqueueEventSystem {
    pub fn new(max_fds: usize) -> Result<Self, DomainError> {
        // SAFETY: plain syscall, result checked below.
        let raw = unsafe { libc::kqueue() };
        if raw < 0 {
            return Err(DomainError::EventSystem(format!(
                "kqueue failed: {}",
                io::Error::last_os_error()
            )));
        }
        // SAFETY: `raw` is a freshly created descriptor we exclusively own.
        let kq = unsafe { OwnedFd::from_raw_fd(raw) };

        let batch = max_fds.clamp(1, MAX_EVENTS_PER_WAIT);
        // SAFETY: kevent is plain data; all-zero is a valid value.
        let empty: libc::kevent = unsafe { std::mem::zeroed() };
        Ok(Self {
            kq,
            table: FdTable::new(max_fds),
            events: vec![empty; batch],
            fired: Vec::with_capacity(batch),
        })
    }

    fn take_interest(&mut self, fd: RawFd, direction: Direction) -> Option<Token> {
        let token = self.table.get(fd)?.token(direction)?;
        if let Err(e) = self.clear_interest(fd, direction) {
            warn!(fd, direction = direction.as_str(), error = %e, "Failed to clear fired interest");
        }
        Some(token)
    }
}

fn submit_change(kq: RawFd, fd: RawFd, direction: Direction, add: bool) -> Result<(), DomainError> {
    // SAFETY: kevent is plain data; all-zero is a valid value.
    let mut change: libc::kevent = unsafe { std::mem::zeroed() };
    change.ident = fd as libc::uintptr_t;
    change.filter = match direction {
        Direction::Read => libc::EVFILT_READ,
        Direction::Write => libc::EVFILT_WRITE,
    };
    change.flags = if add {
        libc::EV_ADD | libc::EV_ENABLE
    } else {
        libc::EV_DELETE
    };

    // SAFETY: one valid change record, no output buffer.
    let ret = unsafe { libc::kevent(kq, &change, 1, ptr::null_mut(), 0, ptr::null()) };
    if ret < 0 {
        return Err(DomainError::EventSystem(format!(
            "kevent(fd {}, {}) failed: {}",
            fd,
            direction.as_str(),
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

impl EventSystem for KqueueEventSystem {
    fn backend_name(&self) -> &'static str {
        "kqueue"
    }

    fn capacity(&self) -> usize {
        self.table.capacity()
    }

    fn set_interest(
        &mut self,
        fd: RawFd,
        direction: Direction,
        token: Token,
    ) -> Result<(), DomainError> {
        let entry = self.table.get_mut(fd)?;
        let was_set = entry.is_set(direction);
        entry.set(direction, token);
        if was_set {
            return Ok(());
        }

        if let Err(e) = submit_change(self.kq.as_raw_fd(), fd, direction, true) {
            self.table.get_mut(fd)?.clear(direction);
            return Err(e);
        }
        Ok(())
    }

    fn clear_interest(&mut self, fd: RawFd, direction: Direction) -> Result<(), DomainError> {
        if self.table.get_mut(fd)?.clear(direction).is_none() {
            return Ok(());
        }
        submit_change(self.kq.as_raw_fd(), fd, direction, false)
    }

    fn is_interested(&self, fd: RawFd, direction: Direction) -> bool {
        self.table.is_interested(fd, direction)
    }

    fn dispatch(
        &mut self,
        timeout: Duration,
        handler: &mut dyn ReadinessHandler,
    ) -> Result<usize, DomainError> {
        let ts = libc::timespec {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_nsec: timeout.subsec_nanos() as libc::c_long,
        };
        let mut events = std::mem::take(&mut self.events);

        // SAFETY: the output buffer is valid for `events.len()` entries.
        let ready = unsafe {
            libc::kevent(
                self.kq.as_raw_fd(),
                ptr::null(),
                0,
                events.as_mut_ptr(),
                events.len() as libc::c_int,
                &ts,
            )
        };
        if ready < 0 {
            let err = io::Error::last_os_error();
            self.events = events;
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(DomainError::EventSystem(format!("kevent wait failed: {}", err)));
        }

        let mut fired = std::mem::take(&mut self.fired);
        fired.clear();
        fired.extend(events[..ready as usize].iter().map(|event| {
            let failed = event.flags & (libc::EV_EOF | libc::EV_ERROR) != 0;
            Fired {
                fd: event.ident as RawFd,
                writable: failed || event.filter == libc::EVFILT_WRITE,
                readable: failed || event.filter == libc::EVFILT_READ,
            }
        }));
        self.events = events;

        // One entry per descriptor; read and write filters fire separately.
        fired.sort_unstable_by_key(|event| event.fd);
        fired.dedup_by(|later, kept| {
            if later.fd != kept.fd {
                return false;
            }
            kept.writable |= later.writable;
            kept.readable |= later.readable;
            true
        });

        // Writes before reads for the whole batch.
        for event in fired.iter().filter(|event| event.writable) {
            if let Some(token) = self.take_interest(event.fd, Direction::Write) {
                handler.on_writable(self, token);
            }
        }
        for event in fired.iter().filter(|event| event.readable) {
            if let Some(token) = self.take_interest(event.fd, Direction::Read) {
                handler.on_readable(self, token);
            }
        }

        let descriptors = fired.len();
        self.fired = fired;
        Ok(descriptors)
    }
}
