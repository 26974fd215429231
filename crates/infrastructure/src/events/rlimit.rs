use std::io;
use tracing::{debug, warn};

/// Raises the soft `RLIMIT_NOFILE` to `target` (capped at the hard limit).
/// Returns the soft limit in effect afterwards.
pub fn raise_nofile_limit(target: usize) -> io::Result<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, writable rlimit.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let wanted = target as libc::rlim_t;
    if limit.rlim_cur >= wanted {
        return Ok(limit.rlim_cur as u64);
    }

    let raised = if limit.rlim_max == libc::RLIM_INFINITY {
        wanted
    } else {
        wanted.min(limit.rlim_max)
    };
    let new_limit = libc::rlimit {
        rlim_cur: raised,
        rlim_max: limit.rlim_max,
    };
    // SAFETY: `new_limit` is a valid rlimit.
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &new_limit) } != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(raised as u64)
}

/// Best effort: a failure or a lower hard limit is only logged.
pub fn ensure_descriptor_limit(target: usize) {
    match raise_nofile_limit(target) {
        Ok(current) if current < target as u64 => {
            warn!(
                current,
                wanted = target,
                "Descriptor limit is below the event table bound"
            );
        }
        Ok(current) => debug!(current, "Descriptor limit"),
        Err(e) => warn!(wanted = target, error = %e, "Failed to raise descriptor limit"),
    }
}
