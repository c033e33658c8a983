//! Step size control for implicit time stepping.
//!
//! A [`Stepsize`] holds the current `dt` and, when adaptive, an
//! [`AdaptivePolicy`] describing how `dt` reacts to the nonlinear solver:
//!
//! - cheap convergence (few Newton iterations) grows the step,
//! - expensive convergence shrinks it even though the step was accepted,
//! - divergence shrinks it and the step is retried,
//! - once the policy's stopping time is reached the step no longer grows.
//!
//! The controller never proposes a step below `dt_min`. A divergence that
//! would push `dt` under the floor is reported as [`ShrinkError::TooSmall`].

mod error;
mod policy;

pub use error::{ShrinkError, StepsizeError};
pub use policy::{AdaptivePolicy, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_ITERATIONS, PolicyError};

/// The time step size of a transient run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stepsize {
    value: f64,
    policy: Option<AdaptivePolicy>,
}

impl Stepsize {
    /// Creates a step size that never changes.
    ///
    /// # Errors
    ///
    /// Returns [`StepsizeError::NotPositive`] if `dt` is not finite and positive.
    pub fn fixed(dt: f64) -> Result<Self, StepsizeError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(StepsizeError::NotPositive(dt));
        }
        Ok(Self {
            value: dt,
            policy: None,
        })
    }

    /// Creates a step size that adapts to solver effort according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns a [`StepsizeError`] if `dt` is not positive or lies outside
    /// the policy's `[dt_min, dt_max]` range.
    pub fn adaptive(dt: f64, policy: AdaptivePolicy) -> Result<Self, StepsizeError> {
        let mut stepsize = Self::fixed(dt)?;

        if dt < policy.dt_min() {
            return Err(StepsizeError::BelowMinimum {
                dt,
                dt_min: policy.dt_min(),
            });
        }
        if let Some(dt_max) = policy.dt_max().filter(|&dt_max| dt > dt_max) {
            return Err(StepsizeError::AboveMaximum { dt, dt_max });
        }

        stepsize.policy = Some(policy);
        Ok(stepsize)
    }

    /// Returns the step size to attempt next.
    #[must_use]
    pub fn propose(&self) -> f64 {
        self.value
    }

    /// Returns the adaptive policy, if any.
    #[must_use]
    pub fn policy(&self) -> Option<&AdaptivePolicy> {
        self.policy.as_ref()
    }

    /// Updates the step size after a step converged in `iterations`.
    ///
    /// `current_time` is the time reached by the accepted step. From the
    /// policy's stopping time onwards the step never grows and is held under
    /// the post-stop cap, if one is configured.
    pub fn on_success(&mut self, iterations: usize, current_time: f64) {
        let Some(policy) = self.policy else {
            return;
        };

        if policy.is_frozen(current_time) {
            if let Some(cap) = policy.max_after_stop() {
                self.value = self.value.min(cap);
            }
            return;
        }

        let [min_iterations, max_iterations] = policy.iteration_band();
        if iterations <= min_iterations {
            self.value *= policy.growth_factor();
        } else if iterations >= max_iterations {
            self.value = (self.value * policy.shrink_factor()).max(policy.dt_min());
        }

        if let Some(dt_max) = policy.dt_max() {
            self.value = self.value.min(dt_max);
        }
    }

    /// Shrinks the step size after a diverged attempt and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`ShrinkError::TooSmall`] if the reduced step would fall below
    /// `dt_min` (the step size is left unchanged), or
    /// [`ShrinkError::NotAdaptive`] for a fixed step size.
    pub fn on_failure(&mut self) -> Result<f64, ShrinkError> {
        let Some(policy) = self.policy else {
            return Err(ShrinkError::NotAdaptive { dt: self.value });
        };

        let dt = self.value * policy.shrink_factor();
        if dt < policy.dt_min() {
            return Err(ShrinkError::TooSmall {
                dt,
                dt_min: policy.dt_min(),
            });
        }

        self.value = dt;
        Ok(dt)
    }

    /// Lowers the step size to `dt` when an attempt used a clipped step.
    ///
    /// Never lowers it under `dt_min`, so a subsequent
    /// [`on_failure`](Self::on_failure) shrinks from the step actually tried.
    pub(crate) fn cap(&mut self, dt: f64) {
        let floor = self.policy.map_or(0.0, |policy| policy.dt_min());
        if dt < self.value {
            self.value = dt.max(floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn policy() -> AdaptivePolicy {
        AdaptivePolicy::new(1.1, 0.5, [5, 10], 1e-3).unwrap()
    }

    #[test]
    fn propose_has_no_side_effect() {
        let stepsize = Stepsize::adaptive(0.5, policy()).unwrap();
        assert_relative_eq!(stepsize.propose(), 0.5);
        assert_relative_eq!(stepsize.propose(), 0.5);
    }

    #[test]
    fn cheap_convergence_grows() {
        let mut stepsize = Stepsize::adaptive(0.5, policy()).unwrap();
        stepsize.on_success(3, 0.5);
        assert_relative_eq!(stepsize.propose(), 0.55);
    }

    #[test]
    fn convergence_within_band_keeps_step() {
        let mut stepsize = Stepsize::adaptive(0.5, policy()).unwrap();
        stepsize.on_success(8, 0.5);
        assert_relative_eq!(stepsize.propose(), 0.5);
    }

    #[test]
    fn expensive_convergence_shrinks() {
        let mut stepsize = Stepsize::adaptive(0.5, policy()).unwrap();
        stepsize.on_success(10, 0.5);
        assert_relative_eq!(stepsize.propose(), 0.25);
    }

    #[test]
    fn expensive_convergence_respects_floor() {
        let mut stepsize = Stepsize::adaptive(1.5e-3, policy()).unwrap();
        stepsize.on_success(12, 0.5);
        assert_relative_eq!(stepsize.propose(), 1e-3);
    }

    #[test]
    fn growth_is_clamped_to_dt_max() {
        let policy = policy().with_dt_max(0.52).unwrap();
        let mut stepsize = Stepsize::adaptive(0.5, policy).unwrap();
        stepsize.on_success(1, 0.5);
        assert_relative_eq!(stepsize.propose(), 0.52);
    }

    #[test]
    fn growth_freezes_after_stopping_time() {
        let policy = policy().with_stopping_time(2.0).unwrap();
        let mut stepsize = Stepsize::adaptive(0.5, policy).unwrap();

        stepsize.on_success(1, 1.0);
        let before_stop = stepsize.propose();
        assert_relative_eq!(before_stop, 0.55);

        for iterations in [0, 1, 5, 10, 50] {
            stepsize.on_success(iterations, 2.0);
            assert_relative_eq!(stepsize.propose(), before_stop);
        }
    }

    #[test]
    fn step_is_capped_after_stopping_time() {
        let policy = policy()
            .with_stopping_time(2.0)
            .and_then(|p| p.with_max_after_stop(0.1))
            .unwrap();
        let mut stepsize = Stepsize::adaptive(0.5, policy).unwrap();

        stepsize.on_success(1, 2.5);
        assert_relative_eq!(stepsize.propose(), 0.1);
    }

    #[test]
    fn failure_shrinks() {
        let mut stepsize = Stepsize::adaptive(0.55, policy()).unwrap();
        assert_relative_eq!(stepsize.on_failure().unwrap(), 0.275);
        assert_relative_eq!(stepsize.propose(), 0.275);
    }

    #[test]
    fn failure_below_floor_is_fatal_and_keeps_step() {
        let mut stepsize = Stepsize::adaptive(1.5e-3, policy()).unwrap();

        let err = stepsize.on_failure().unwrap_err();

        assert!(matches!(err, ShrinkError::TooSmall { dt_min, .. } if dt_min == 1e-3));
        assert_relative_eq!(stepsize.propose(), 1.5e-3);
    }

    #[test]
    fn proposed_step_never_drops_below_floor() {
        let mut stepsize = Stepsize::adaptive(1.0, policy()).unwrap();
        while stepsize.on_failure().is_ok() {
            assert!(stepsize.propose() >= 1e-3);
        }
        assert!(stepsize.propose() >= 1e-3);
    }

    #[test]
    fn fixed_step_never_changes() {
        let mut stepsize = Stepsize::fixed(0.1).unwrap();
        stepsize.on_success(0, 1.0);
        stepsize.on_success(100, 2.0);
        assert_relative_eq!(stepsize.propose(), 0.1);
        assert_eq!(
            stepsize.on_failure(),
            Err(ShrinkError::NotAdaptive { dt: 0.1 })
        );
    }

    #[test]
    fn initial_step_must_fit_policy() {
        assert_eq!(
            Stepsize::adaptive(1e-4, policy()),
            Err(StepsizeError::BelowMinimum {
                dt: 1e-4,
                dt_min: 1e-3
            })
        );
        assert_eq!(
            Stepsize::adaptive(2.0, policy().with_dt_max(1.0).unwrap()),
            Err(StepsizeError::AboveMaximum {
                dt: 2.0,
                dt_max: 1.0
            })
        );
        assert_eq!(Stepsize::fixed(-1.0), Err(StepsizeError::NotPositive(-1.0)));
    }

    #[test]
    fn cap_lowers_but_respects_floor() {
        let mut stepsize = Stepsize::adaptive(0.5, policy()).unwrap();
        stepsize.cap(0.2);
        assert_relative_eq!(stepsize.propose(), 0.2);
        stepsize.cap(0.3);
        assert_relative_eq!(stepsize.propose(), 0.2);
        stepsize.cap(1e-6);
        assert_relative_eq!(stepsize.propose(), 1e-3);
    }
}
