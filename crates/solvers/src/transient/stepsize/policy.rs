use thiserror::Error;

/// Iteration count at or below which the step grows, when built from a
/// change ratio.
pub const DEFAULT_MIN_ITERATIONS: usize = 4;

/// Iteration count at or above which the step shrinks, when built from a
/// change ratio.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Errors that can occur when validating an adaptive stepsize policy.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PolicyError {
    #[error("growth factor must be finite and greater than 1, got {0}")]
    GrowthFactor(f64),

    #[error("shrink factor must be in (0, 1), got {0}")]
    ShrinkFactor(f64),

    #[error("iteration band must satisfy min < max, got [{min}, {max}]")]
    IterationBand { min: usize, max: usize },

    #[error("dt_min must be finite and positive, got {0}")]
    DtMin(f64),

    #[error("dt_max must be finite and at least dt_min ({dt_min}), got {dt_max}")]
    DtMax { dt_max: f64, dt_min: f64 },

    #[error("stopping time must be finite, got {0}")]
    StoppingTime(f64),

    #[error("step cap after the stopping time must be finite and at least dt_min ({dt_min}), got {cap}")]
    MaxAfterStop { cap: f64, dt_min: f64 },
}

/// How an adaptive [`Stepsize`](super::Stepsize) reacts to solver effort.
///
/// A policy is built once from configuration and never changes during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptivePolicy {
    growth_factor: f64,
    shrink_factor: f64,
    min_iterations: usize,
    max_iterations: usize,
    dt_min: f64,
    dt_max: Option<f64>,
    stopping_time: Option<f64>,
    max_after_stop: Option<f64>,
}

impl AdaptivePolicy {
    /// Creates a policy with validated factors, iteration band, and floor.
    ///
    /// Steps converging in `min_iterations` or fewer iterations grow by
    /// `growth_factor`; steps needing `max_iterations` or more shrink by
    /// `shrink_factor`.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if a factor is out of range, the band is
    /// empty, or `dt_min` is not positive.
    pub fn new(
        growth_factor: f64,
        shrink_factor: f64,
        [min_iterations, max_iterations]: [usize; 2],
        dt_min: f64,
    ) -> Result<Self, PolicyError> {
        if !growth_factor.is_finite() || growth_factor <= 1.0 {
            return Err(PolicyError::GrowthFactor(growth_factor));
        }
        if !shrink_factor.is_finite() || shrink_factor <= 0.0 || shrink_factor >= 1.0 {
            return Err(PolicyError::ShrinkFactor(shrink_factor));
        }
        if min_iterations >= max_iterations {
            return Err(PolicyError::IterationBand {
                min: min_iterations,
                max: max_iterations,
            });
        }
        if !dt_min.is_finite() || dt_min <= 0.0 {
            return Err(PolicyError::DtMin(dt_min));
        }

        Ok(Self {
            growth_factor,
            shrink_factor,
            min_iterations,
            max_iterations,
            dt_min,
            dt_max: None,
            stopping_time: None,
            max_after_stop: None,
        })
    }

    /// Creates a policy from a single change ratio `r`: steps grow by `r` and
    /// shrink by `1 / r`, using the default iteration band.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if `ratio` is not greater than 1 or `dt_min`
    /// is not positive.
    pub fn from_change_ratio(ratio: f64, dt_min: f64) -> Result<Self, PolicyError> {
        Self::new(
            ratio,
            ratio.recip(),
            [DEFAULT_MIN_ITERATIONS, DEFAULT_MAX_ITERATIONS],
            dt_min,
        )
    }

    /// Sets an upper bound on the step size.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DtMax`] if `dt_max` is below `dt_min`.
    pub fn with_dt_max(mut self, dt_max: f64) -> Result<Self, PolicyError> {
        if !dt_max.is_finite() || dt_max < self.dt_min {
            return Err(PolicyError::DtMax {
                dt_max,
                dt_min: self.dt_min,
            });
        }
        self.dt_max = Some(dt_max);
        Ok(self)
    }

    /// Sets the time from which the step size no longer grows.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::StoppingTime`] if `time` is not finite.
    pub fn with_stopping_time(mut self, time: f64) -> Result<Self, PolicyError> {
        if !time.is_finite() {
            return Err(PolicyError::StoppingTime(time));
        }
        self.stopping_time = Some(time);
        Ok(self)
    }

    /// Sets a cap applied to the step size once the stopping time is reached.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MaxAfterStop`] if `cap` is below `dt_min`.
    pub fn with_max_after_stop(mut self, cap: f64) -> Result<Self, PolicyError> {
        if !cap.is_finite() || cap < self.dt_min {
            return Err(PolicyError::MaxAfterStop {
                cap,
                dt_min: self.dt_min,
            });
        }
        self.max_after_stop = Some(cap);
        Ok(self)
    }

    #[must_use]
    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    #[must_use]
    pub fn shrink_factor(&self) -> f64 {
        self.shrink_factor
    }

    /// Returns the `[min, max]` iteration band.
    #[must_use]
    pub fn iteration_band(&self) -> [usize; 2] {
        [self.min_iterations, self.max_iterations]
    }

    #[must_use]
    pub fn dt_min(&self) -> f64 {
        self.dt_min
    }

    #[must_use]
    pub fn dt_max(&self) -> Option<f64> {
        self.dt_max
    }

    #[must_use]
    pub fn stopping_time(&self) -> Option<f64> {
        self.stopping_time
    }

    #[must_use]
    pub fn max_after_stop(&self) -> Option<f64> {
        self.max_after_stop
    }

    /// Returns `true` if growth is frozen at `time`.
    #[must_use]
    pub fn is_frozen(&self, time: f64) -> bool {
        self.stopping_time.is_some_and(|stop| time >= stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn change_ratio_gives_reciprocal_factors() {
        let policy = AdaptivePolicy::from_change_ratio(1.25, 1e-6).unwrap();
        assert_relative_eq!(policy.growth_factor(), 1.25);
        assert_relative_eq!(policy.shrink_factor(), 0.8);
        assert_eq!(policy.iteration_band(), [4, 5]);
    }

    #[test]
    fn rejects_out_of_range_factors() {
        assert_eq!(
            AdaptivePolicy::new(1.0, 0.5, [2, 5], 1e-3),
            Err(PolicyError::GrowthFactor(1.0))
        );
        assert_eq!(
            AdaptivePolicy::new(1.1, 1.5, [2, 5], 1e-3),
            Err(PolicyError::ShrinkFactor(1.5))
        );
        assert_eq!(
            AdaptivePolicy::new(1.1, 0.5, [5, 5], 1e-3),
            Err(PolicyError::IterationBand { min: 5, max: 5 })
        );
        assert_eq!(
            AdaptivePolicy::new(1.1, 0.5, [2, 5], 0.0),
            Err(PolicyError::DtMin(0.0))
        );
    }

    #[test]
    fn optional_bounds_are_validated() {
        let policy = AdaptivePolicy::new(1.1, 0.5, [5, 10], 1e-3).unwrap();

        assert!(policy.with_dt_max(1e-4).is_err());
        assert!(policy.with_max_after_stop(1e-4).is_err());
        assert!(policy.with_stopping_time(f64::INFINITY).is_err());

        let policy = policy
            .with_dt_max(10.0)
            .and_then(|p| p.with_stopping_time(100.0))
            .and_then(|p| p.with_max_after_stop(1.0))
            .unwrap();

        assert_eq!(policy.dt_max(), Some(10.0));
        assert!(!policy.is_frozen(99.0));
        assert!(policy.is_frozen(100.0));
    }
}
