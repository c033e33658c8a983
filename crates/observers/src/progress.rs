use std::time::Instant;

use permeate_core::Observer;
use tracing::info;

use crate::traits::HasTime;

/// Smallest reporting interval, in percent.
const MIN_INTERVAL: f64 = 0.01;

/// Logs run progress as a percentage of the final time.
///
/// A line is logged each time progress crosses a multiple of `interval`
/// percent, with the simulated time and the wall time elapsed since the
/// logger was created. Never requests an action.
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    start_time: f64,
    final_time: f64,
    interval: f64,
    next_report: f64,
    progress: f64,
    started: Instant,
}

impl ProgressLogger {
    /// Creates a logger for a run from `t = 0` to `final_time`, reporting
    /// every 10 percent.
    #[must_use]
    pub fn new(final_time: f64) -> Self {
        Self::over(0.0, final_time)
    }

    /// Creates a logger for a run from `start_time` to `final_time`.
    #[must_use]
    pub fn over(start_time: f64, final_time: f64) -> Self {
        Self {
            start_time,
            final_time,
            interval: 10.0,
            next_report: 10.0,
            progress: 0.0,
            started: Instant::now(),
        }
    }

    /// Sets the reporting interval in percent, clamped to `[0.01, 100]`.
    /// A non-positive or NaN interval reports only at completion.
    #[must_use]
    pub fn every(mut self, percent: f64) -> Self {
        self.interval = if percent > 0.0 {
            percent.clamp(MIN_INTERVAL, 100.0)
        } else {
            100.0
        };
        self.next_report = self.interval;
        self
    }

    /// Latest observed progress, in percent.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    fn percent(&self, time: f64) -> f64 {
        let span = self.final_time - self.start_time;
        if span > 0.0 {
            (100.0 * (time - self.start_time) / span).clamp(0.0, 100.0)
        } else {
            100.0
        }
    }
}

impl<E: HasTime, A> Observer<E, A> for ProgressLogger {
    fn observe(&mut self, event: &E) -> Option<A> {
        let time = event.time();
        self.progress = self.percent(time);

        if self.progress >= self.next_report {
            info!(
                "{:.1} % {:.1e} s    Elapsed time so far: {:.1} s",
                self.progress,
                time,
                self.started.elapsed().as_secs_f64()
            );
            let crossed = (self.progress / self.interval).floor();
            self.next_report = (crossed + 1.0) * self.interval;
            if self.next_report <= self.progress {
                self.next_report += self.interval;
            }
        }
        None
    }
}
