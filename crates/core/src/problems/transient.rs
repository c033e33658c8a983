use crate::{CouplingOutcome, SolveOutcome};

/// Defines a transient problem advanced one implicit time step at a time.
///
/// A transient problem wraps an external nonlinear system (the assembled
/// residual and Jacobian of the transport equations) and attempts to advance
/// a state from `time` to `time + dt`. The time-stepping driver decides what to
/// do with the outcome: accept the new state, or retry from the same state
/// with a smaller step.
///
/// The state is borrowed immutably, so a diverged attempt cannot leave a
/// partially updated state behind. Jacobian assembly, preconditioner reuse,
/// and similar solver bookkeeping are internal to the implementation.
pub trait TransientProblem {
    type State;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attempts to advance `state` from `time` by `dt`.
    ///
    /// On convergence, returns the new state together with the true number of
    /// nonlinear iterations the solver used. The driver uses that count to
    /// grow or shrink the next step.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the attempt cannot be carried out at all.
    /// A solver that runs but fails to converge must report
    /// [`SolveOutcome::Diverged`] instead.
    fn attempt_step(
        &mut self,
        state: &Self::State,
        time: f64,
        dt: f64,
    ) -> Result<SolveOutcome<Self::State>, Self::Error>;

    /// Solves a coupled field (such as temperature) ahead of the main solve.
    ///
    /// Called once per accepted time, before the first
    /// [`attempt_step`](Self::attempt_step) from it and with that attempt's
    /// `time` and `dt`. Retries after a divergence reuse the coupled solution.
    /// A diverged coupling solve is fatal for the run.
    ///
    /// The default implementation reports [`CouplingOutcome::Skipped`]. Only
    /// implement this method if the problem carries a coupled field.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the coupled solve cannot be carried out.
    fn solve_coupling(&mut self, _time: f64, _dt: f64) -> Result<CouplingOutcome, Self::Error> {
        Ok(CouplingOutcome::Skipped)
    }
}
