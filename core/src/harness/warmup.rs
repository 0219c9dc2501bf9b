//! CPU warm-up before timing

use std::time::{Duration, Instant};

/// Default busy-wait length
pub const WARMUP_DURATION: Duration = Duration::from_secs(2);

/// Spin every thread of the global rayon pool for `duration`
///
/// Gets clocks out of low-power states so the timed run is not skewed by
/// frequency ramp-up. Touches no shared state.
pub fn warm_up(duration: Duration) {
    let start = Instant::now();
    let threads = rayon::broadcast(|_| {
        while start.elapsed() < duration {
            std::hint::spin_loop();
        }
    });
    tracing::debug!(
        threads = threads.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "warm-up finished"
    );
}
