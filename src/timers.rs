//! Phase timing for resolutions.
//!
//! The resolver times the strategy run (`compute_ms`) separately from the
//! whole call (`total_ms`); whatever is left over is path parsing and cache
//! traffic.

use std::time::{Duration, Instant};

/// Adds the time until drop to `slot`. The resolver wraps the strategy call
/// in one of these, so a resolution that fails part way through a relation
/// chain still reports the compute time it spent.
///
/// ```rust
/// use std::time::Duration;
/// use pathway_core::PhaseTimer;
///
/// let mut compute = Duration::ZERO;
/// for _ in 0..2 {
///     let _timer = PhaseTimer::new(&mut compute);
///     std::thread::sleep(Duration::from_millis(1));
/// }
/// assert!(compute >= Duration::from_millis(2));
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Milliseconds as a float, for [`crate::metrics::ResolutionPhases`].
pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
