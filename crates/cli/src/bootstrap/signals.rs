use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

/// Returns a flag that SIGINT/SIGTERM raise; the run loop polls it.
pub fn install_stop_handlers() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));

    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop)) {
        warn!("Failed to register SIGINT handler: {}", e);
    }
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&stop)) {
        warn!("Failed to register SIGTERM handler: {}", e);
    }

    stop
}
