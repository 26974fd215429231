//! Event-system backends and startup selection.

pub mod fd_table;
pub mod rlimit;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod epoll;

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd"
))]
pub mod kqueue;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use epoll::EpollEventSystem;
pub use fd_table::{FdInterest, FdTable};
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd"
))]
pub use kqueue::KqueueEventSystem;

use ferrous_dnsperf_application::ports::EventSystem;
use ferrous_dnsperf_domain::DomainError;
use tracing::info;

/// Picks the platform's backend once, sized for descriptors `0..max_fds`,
/// and raises the descriptor limit to match.
pub fn select_event_system(max_fds: usize) -> Result<Box<dyn EventSystem>, DomainError> {
    rlimit::ensure_descriptor_limit(max_fds);

    let backend = open_backend(max_fds)?;
    info!(
        backend = backend.backend_name(),
        max_fds, "Event system initialized"
    );
    Ok(backend)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn open_backend(max_fds: usize) -> Result<Box<dyn EventSystem>, DomainError> {
    Ok(Box::new(EpollEventSystem::new(max_fds)?))
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd"
))]
fn open_backend(max_fds: usize) -> Result<Box<dyn EventSystem>, DomainError> {
    Ok(Box::new(KqueueEventSystem::new(max_fds)?))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd"
)))]
fn open_backend(_max_fds: usize) -> Result<Box<dyn EventSystem>, DomainError> {
    Err(DomainError::UnsupportedPlatform)
}
