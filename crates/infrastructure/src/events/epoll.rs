//! Readiness-list backend (Linux epoll).

use super::fd_table::FdTable;
use ferrous_dnsperf_application::ports::{Direction, EventSystem, ReadinessHandler, Token};
use ferrous_dnsperf_domain::DomainError;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;
use tracing::warn;

/// Upper bound on events returned by one `epoll_wait`
const MAX_EVENTS_PER_WAIT: usize = 1024;

pub struct EpollEventSystem {
    epfd: OwnedFd,
    table: FdTable,
    events: Vec<libc::epoll_event>,
}

impl EpollEventSystem {
    pub fn new(max_fds: usize) -> Result<Self, DomainError> {
        // SAFETY: plain syscall, result checked below.
        let raw = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if raw < 0 {
            return Err(DomainError::EventSystem(format!(
                "epoll_create1 failed: {}",
                io::Error::last_os_error()
            )));
        }
        // SAFETY: `raw` is a freshly created descriptor we exclusively own.
        let epfd = unsafe { OwnedFd::from_raw_fd(raw) };

        let batch = max_fds.clamp(1, MAX_EVENTS_PER_WAIT);
        Ok(Self {
            epfd,
            table: FdTable::new(max_fds),
            events: vec![libc::epoll_event { events: 0, u64: 0 }; batch],
        })
    }

    /// Drops interest in `direction` and returns its token, if registered.
    fn take_interest(&mut self, fd: RawFd, direction: Direction) -> Option<Token> {
        let token = self.table.get(fd)?.token(direction)?;
        if let Err(e) = self.clear_interest(fd, direction) {
            warn!(fd, direction = direction.as_str(), error = %e, "Failed to clear fired interest");
        }
        Some(token)
    }
}

fn event_mask(read: bool, write: bool) -> u32 {
    let mut mask = 0;
    if read {
        mask |= libc::EPOLLIN as u32;
    }
    if write {
        mask |= libc::EPOLLOUT as u32;
    }
    mask
}

fn epoll_ctl(epfd: RawFd, op: libc::c_int, fd: RawFd, mask: u32) -> Result<(), DomainError> {
    let mut event = libc::epoll_event {
        events: mask,
        u64: fd as u64,
    };
    // SAFETY: `event` outlives the call; kernel validates descriptors.
    if unsafe { libc::epoll_ctl(epfd, op, fd, &mut event) } < 0 {
        return Err(DomainError::EventSystem(format!(
            "epoll_ctl(fd {}) failed: {}",
            fd,
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

impl EventSystem for EpollEventSystem {
    fn backend_name(&self) -> &'static str {
        "epoll"
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
        let previous = *entry;
        entry.set(direction, token);

        let op = if previous.is_empty() {
            libc::EPOLL_CTL_ADD
        } else {
            libc::EPOLL_CTL_MOD
        };
        let mask = event_mask(entry.is_set(Direction::Read), entry.is_set(Direction::Write));

        if let Err(e) = epoll_ctl(self.epfd.as_raw_fd(), op, fd, mask) {
            *self.table.get_mut(fd)? = previous;
            return Err(e);
        }
        Ok(())
    }

    fn clear_interest(&mut self, fd: RawFd, direction: Direction) -> Result<(), DomainError> {
        let entry = self.table.get_mut(fd)?;
        let previous = *entry;
        if entry.clear(direction).is_none() {
            return Ok(());
        }

        let result = if entry.is_empty() {
            epoll_ctl(self.epfd.as_raw_fd(), libc::EPOLL_CTL_DEL, fd, 0)
        } else {
            let mask = event_mask(entry.is_set(Direction::Read), entry.is_set(Direction::Write));
            epoll_ctl(self.epfd.as_raw_fd(), libc::EPOLL_CTL_MOD, fd, mask)
        };

        if result.is_err() {
            *self.table.get_mut(fd)? = previous;
        }
        result
    }

    fn is_interested(&self, fd: RawFd, direction: Direction) -> bool {
        self.table.is_interested(fd, direction)
    }

    fn dispatch(
        &mut self,
        timeout: Duration,
        handler: &mut dyn ReadinessHandler,
    ) -> Result<usize, DomainError> {
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        let mut events = std::mem::take(&mut self.events);

        // SAFETY: the buffer is valid for `events.len()` entries.
        let ready = unsafe {
            libc::epoll_wait(
                self.epfd.as_raw_fd(),
                events.as_mut_ptr(),
                events.len() as libc::c_int,
                timeout_ms,
            )
        };
        if ready < 0 {
            let err = io::Error::last_os_error();
            self.events = events;
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(DomainError::EventSystem(format!("epoll_wait failed: {}", err)));
        }

        let ready = ready as usize;
        for event in &events[..ready] {
            let fd = event.u64 as RawFd;
            let flags = event.events;

            let failed = flags & (libc::EPOLLERR | libc::EPOLLHUP) as u32 != 0;
            let writable = failed || flags & libc::EPOLLOUT as u32 != 0;
            let readable = failed || flags & (libc::EPOLLIN | libc::EPOLLRDHUP) as u32 != 0;

            let write_token = if writable {
                self.take_interest(fd, Direction::Write)
            } else {
                None
            };
            let read_token = if readable {
                self.take_interest(fd, Direction::Read)
            } else {
                None
            };

            if let Some(token) = write_token {
                handler.on_writable(self, token);
            }
            if let Some(token) = read_token {
                handler.on_readable(self, token);
            }
        }

        self.events = events;
        Ok(ready)
    }
}
