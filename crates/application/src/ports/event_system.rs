use ferrous_dnsperf_domain::DomainError;
use std::os::fd::RawFd;
use std::time::Duration;

/// I/O direction a descriptor can be watched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub fn index(&self) -> usize {
        match self {
            Direction::Read => 0,
            Direction::Write => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Read => "read",
            Direction::Write => "write",
        }
    }
}

/// Opaque callback context stored with a registration.
/// The dispatch engine uses the slot index.
pub type Token = usize;

/// Receives readiness notifications from [`EventSystem::dispatch`].
///
/// Interest for the ready direction has already been cleared when a callback
/// runs; the handler re-registers through `events` if it wants to keep
/// watching.
pub trait ReadinessHandler {
    fn on_writable(&mut self, events: &mut dyn EventSystem, token: Token);

    fn on_readable(&mut self, events: &mut dyn EventSystem, token: Token);
}

/// Readiness-notification facility (epoll- or kqueue-backed).
///
/// Exactly one implementation is active per run; it is chosen once at
/// startup and released on drop.
pub trait EventSystem {
    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;

    /// Descriptor table bound; descriptors at or past it cannot be watched
    fn capacity(&self) -> usize;

    fn can_track(&self, fd: RawFd) -> bool {
        usize::try_from(fd).is_ok_and(|index| index < self.capacity())
    }

    /// Registers or updates interest in `direction` for `fd`.
    ///
    /// Adds the descriptor to the backend when it has no interest yet,
    /// modifies the existing registration otherwise.
    fn set_interest(
        &mut self,
        fd: RawFd,
        direction: Direction,
        token: Token,
    ) -> Result<(), DomainError>;

    /// Drops interest in one direction; the descriptor is fully deregistered
    /// once no direction remains.
    fn clear_interest(&mut self, fd: RawFd, direction: Direction) -> Result<(), DomainError>;

    fn is_interested(&self, fd: RawFd, direction: Direction) -> bool;

    /// Waits up to `timeout` for readiness and delivers it to `handler`.
    ///
    /// For each ready descriptor the fired directions are cleared first, then
    /// `on_writable` runs before `on_readable`. Error and hang-up conditions
    /// count as both directions being ready. Returns the number of ready
    /// descriptors.
    fn dispatch(
        &mut self,
        timeout: Duration,
        handler: &mut dyn ReadinessHandler,
    ) -> Result<usize, DomainError>;
}
