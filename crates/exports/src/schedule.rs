use std::collections::VecDeque;

use crate::ExportError;

/// Relative tolerance for deciding that a time has reached a target.
const TIME_RTOL: f64 = 1e-9;

/// Absolute tolerance for deciding that a time has reached a target.
const TIME_ATOL: f64 = 1e-12;

/// When an exporter writes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportTimes {
    /// Write after every accepted step.
    EveryStep,

    /// Write once at (or just after) each target time.
    Discrete(Vec<f64>),
}

impl ExportTimes {
    /// Creates a discrete cadence from arbitrary target times.
    ///
    /// The times are sorted and duplicates are removed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTime`] if a time is not finite.
    pub fn discrete(times: impl Into<Vec<f64>>) -> Result<Self, ExportError> {
        let mut times = times.into();
        if let Some(&bad) = times.iter().find(|t| !t.is_finite()) {
            return Err(ExportError::InvalidTime(bad));
        }
        times.sort_by(f64::total_cmp);
        times.dedup_by(|a, b| is_close(*a, *b));
        Ok(Self::Discrete(times))
    }

    /// Creates a cadence from optional times, as found in configuration:
    /// no times means every step.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTime`] if a time is not finite.
    pub fn from_option(times: Option<Vec<f64>>) -> Result<Self, ExportError> {
        times.map_or(Ok(Self::EveryStep), Self::discrete)
    }
}

/// Decides, step by step, whether an exporter is due.
///
/// In discrete mode each target fires exactly once: the first time the
/// simulated time reaches it, or the first time it is passed if the driver
/// stepped over it.
#[derive(Debug, Clone)]
pub struct Schedule {
    pending: Option<VecDeque<f64>>,
    writes: usize,
    first_write: Option<f64>,
}

impl Schedule {
    #[must_use]
    pub fn new(times: ExportTimes) -> Self {
        let pending = match times {
            ExportTimes::EveryStep => None,
            ExportTimes::Discrete(times) => Some(times.into()),
        };
        Self {
            pending,
            writes: 0,
            first_write: None,
        }
    }

    /// Number of times [`is_due`](Self::is_due) has returned `true`.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Returns `true` if an export is due at `time`, consuming every target
    /// reached so far.
    pub fn is_due(&mut self, time: f64) -> bool {
        let due = match &mut self.pending {
            None => true,
            Some(pending) => {
                let mut due = false;
                while pending.front().is_some_and(|&target| reaches(time, target)) {
                    pending.pop_front();
                    due = true;
                }
                due
            }
        };

        if due {
            self.writes += 1;
            self.first_write.get_or_insert(time);
        }
        due
    }

    /// Returns the smallest pending target strictly after `time`.
    ///
    /// Always `None` in every-step mode, and once the targets are exhausted.
    #[must_use]
    pub fn when_is_next(&self, time: f64) -> Option<f64> {
        self.pending
            .as_ref()?
            .iter()
            .copied()
            .find(|&target| target > time && !is_close(time, target))
    }

    /// Returns `true` if a write at `time` is the first one of the run, so
    /// its destination should be created rather than appended to.
    ///
    /// In discrete mode this holds for the first due write, at whichever time
    /// [`is_due`](Self::is_due) fired, overshoot included. Before anything is
    /// due it tells whether `time` would trigger that first write. In
    /// every-step mode it holds for the first call only (`call_index == 0`).
    #[must_use]
    pub fn is_it_first_write(&self, time: f64, call_index: usize) -> bool {
        let Some(pending) = &self.pending else {
            return call_index == 0;
        };
        match (self.writes, self.first_write) {
            (0, _) => pending.front().is_some_and(|&target| reaches(time, target)),
            (1, Some(first)) => is_close(time, first),
            _ => false,
        }
    }

    /// Returns `true` if `time` coincides with one of the configured targets.
    ///
    /// Unlike [`is_due`](Self::is_due), this neither consumes targets nor
    /// fires for overshooting times. Every time matches in every-step mode.
    #[must_use]
    pub fn is_target(&self, time: f64) -> bool {
        match &self.pending {
            None => true,
            Some(pending) => pending.iter().any(|&target| is_close(time, target)),
        }
    }
}

fn reaches(time: f64, target: f64) -> bool {
    time >= target || is_close(time, target)
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_ATOL + TIME_RTOL * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Schedule {
        Schedule::new(ExportTimes::discrete(vec![1.0, 2.0, 3.0]).unwrap())
    }

    #[test]
    fn next_target_is_strictly_later() {
        let schedule = targets();
        assert_eq!(schedule.when_is_next(0.0), Some(1.0));
        assert_eq!(schedule.when_is_next(0.5), Some(1.0));
        assert_eq!(schedule.when_is_next(1.0), Some(2.0));
        assert_eq!(schedule.when_is_next(2.0), Some(3.0));
        assert_eq!(schedule.when_is_next(3.0), None);
        assert_eq!(schedule.when_is_next(4.0), None);
    }

    #[test]
    fn targets_match_exactly() {
        let schedule = targets();
        assert!(schedule.is_target(1.0));
        assert!(schedule.is_target(2.0));
        assert!(schedule.is_target(3.0));
        for time in [-1.0, 0.0, 1.5, 5.0] {
            assert!(!schedule.is_target(time));
        }
    }

    #[test]
    fn each_target_fires_once() {
        let mut schedule = targets();
        assert!(!schedule.is_due(0.5));
        assert!(schedule.is_due(1.0));
        assert!(!schedule.is_due(1.0));
        assert!(!schedule.is_due(1.5));
        assert!(schedule.is_due(2.0 - 1e-13));
        assert_eq!(schedule.when_is_next(2.0), Some(3.0));
    }

    #[test]
    fn overshooting_several_targets_fires_once() {
        let mut schedule = targets();
        assert!(schedule.is_due(2.5));
        assert!(!schedule.is_due(2.7));
        assert!(schedule.is_due(3.2));
        assert!(!schedule.is_due(10.0));
        assert_eq!(schedule.when_is_next(0.0), None);
    }

    #[test]
    fn every_step_is_always_due() {
        let mut schedule = Schedule::new(ExportTimes::EveryStep);
        assert!(schedule.is_due(0.1));
        assert!(schedule.is_due(0.1));
        assert_eq!(schedule.when_is_next(0.1), None);
    }

    #[test]
    fn first_write_in_discrete_mode() {
        let mut schedule = targets();
        assert!(!schedule.is_it_first_write(0.5, 0));
        assert!(schedule.is_it_first_write(1.0, 0));

        assert!(schedule.is_due(1.0));
        assert!(schedule.is_it_first_write(1.0, 0));
        assert!(!schedule.is_it_first_write(2.0, 0));

        assert!(schedule.is_due(2.0));
        assert!(!schedule.is_it_first_write(2.0, 0));
        assert!(!schedule.is_it_first_write(1.0, 0));
        assert_eq!(schedule.writes(), 2);
    }

    #[test]
    fn overshot_first_target_is_the_first_write() {
        let mut schedule = targets();
        assert!(!schedule.is_due(0.7));
        assert!(schedule.is_it_first_write(1.2, 0));

        assert!(schedule.is_due(1.2));
        assert!(schedule.is_it_first_write(1.2, 0));

        assert!(schedule.is_due(2.0));
        assert!(!schedule.is_it_first_write(2.0, 0));
        assert!(!schedule.is_it_first_write(1.2, 0));
    }

    #[test]
    fn first_write_in_every_step_mode() {
        let mut schedule = Schedule::new(ExportTimes::EveryStep);
        assert!(schedule.is_it_first_write(1.0, 0));
        assert!(schedule.is_it_first_write(5.0, 0));
        assert!(!schedule.is_it_first_write(1.0, 1));
        assert!(!schedule.is_it_first_write(5.0, 2));

        assert!(schedule.is_due(1.0));
        assert!(schedule.is_due(2.0));
        assert_eq!(schedule.writes(), 2);
    }

    #[test]
    fn discrete_times_are_sorted_and_deduplicated() {
        assert_eq!(
            ExportTimes::discrete(vec![3.0, 1.0, 2.0, 1.0]).unwrap(),
            ExportTimes::Discrete(vec![1.0, 2.0, 3.0])
        );
        assert!(matches!(
            ExportTimes::discrete(vec![1.0, f64::NAN]),
            Err(ExportError::InvalidTime(_))
        ));
        assert_eq!(ExportTimes::from_option(None).unwrap(), ExportTimes::EveryStep);
    }
}
