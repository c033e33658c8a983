use std::time::{Duration, Instant};

use permeate_core::Observer;
use tracing::warn;

use crate::traits::{CanStopEarly, HasTime};

/// Stops a run once it has used more than a given amount of wall time.
///
/// The clock starts when the observer is created.
#[derive(Debug, Clone)]
pub struct WallClockLimit {
    limit: Duration,
    started: Instant,
}

impl WallClockLimit {
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: Instant::now(),
        }
    }
}

impl<E: HasTime, A: CanStopEarly> Observer<E, A> for WallClockLimit {
    fn observe(&mut self, event: &E) -> Option<A> {
        let elapsed = self.started.elapsed();
        if elapsed <= self.limit {
            return None;
        }

        warn!(
            time = event.time(),
            elapsed_s = elapsed.as_secs_f64(),
            limit_s = self.limit.as_secs_f64(),
            "wall-clock limit reached, stopping run"
        );
        Some(A::stop_early())
    }
}
