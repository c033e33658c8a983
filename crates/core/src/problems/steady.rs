use crate::SolveOutcome;

/// Defines a steady-state problem solved in a single nonlinear solve.
///
/// The steady formulation drops the time derivative, so there is no step size
/// and no retry policy: the solve either converges or the run fails.
pub trait SteadyProblem {
    type State;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Solves for the steady state, starting from `initial` as the guess.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the solve cannot be carried out.
    fn solve(&mut self, initial: &Self::State) -> Result<SolveOutcome<Self::State>, Self::Error>;
}
