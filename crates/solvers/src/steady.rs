//! Steady-state solves.
//!
//! A steady run is a single nonlinear solve of a [`SteadyProblem`]. There is
//! no step size to adapt, so a diverged solve is an error. The converged state
//! is handed once to the exporter with a steady [`ExportContext`].

use std::error::Error as StdError;

use permeate_core::{ExportContext, Exporter, SolveOutcome, SteadyProblem};
use thiserror::Error;
use tracing::info;

/// Errors that abort a steady run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("steady solve did not converge")]
    Diverged,

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),

    #[error("steady export failed: {0}")]
    Export(#[source] Box<dyn StdError + Send + Sync>),
}

/// The result of a steady run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<S> {
    pub state: S,
    pub iterations: usize,
}

/// Solves `problem` from the `initial` guess and exports the converged state.
///
/// # Errors
///
/// Returns [`Error::Diverged`] if the solve does not converge, or an error
/// from the problem or exporter.
pub fn solve<P, X>(
    problem: &mut P,
    initial: &P::State,
    exporter: &mut X,
) -> Result<Solution<P::State>, Error>
where
    P: SteadyProblem,
    X: Exporter<P::State>,
{
    let outcome = problem
        .solve(initial)
        .map_err(|err| Error::Problem(Box::new(err)))?;

    let SolveOutcome::Converged { state, iterations } = outcome else {
        return Err(Error::Diverged);
    };
    info!(iterations, "steady solve converged");

    exporter
        .export(&state, &ExportContext::steady())
        .map_err(|err| Error::Export(Box::new(err)))?;

    Ok(Solution { state, iterations })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    /// Newton iteration for x² = 2, converging from the guess.
    struct SquareRoot {
        max_iterations: usize,
    }

    impl SteadyProblem for SquareRoot {
        type State = f64;
        type Error = Infallible;

        fn solve(&mut self, initial: &f64) -> Result<SolveOutcome<f64>, Self::Error> {
            let mut x = *initial;
            for iteration in 1..=self.max_iterations {
                let step = (x * x - 2.0) / (2.0 * x);
                x -= step;
                if step.abs() < 1e-12 {
                    return Ok(SolveOutcome::converged(x, iteration));
                }
            }
            Ok(SolveOutcome::Diverged)
        }
    }

    #[derive(Default)]
    struct Captured(Vec<(f64, ExportContext)>);

    impl Exporter<f64> for Captured {
        type Error = Infallible;

        fn export(&mut self, state: &f64, context: &ExportContext) -> Result<(), Self::Error> {
            self.0.push((*state, *context));
            Ok(())
        }
    }

    #[test]
    fn converges_and_exports_once() {
        let mut problem = SquareRoot { max_iterations: 20 };
        let mut exporter = Captured::default();

        let solution = solve(&mut problem, &1.0, &mut exporter).unwrap();

        assert_relative_eq!(solution.state, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert!(solution.iterations > 1);

        assert_eq!(exporter.0.len(), 1);
        assert!(exporter.0[0].1.steady);
        assert_eq!(exporter.0[0].1.step, 0);
    }

    #[test]
    fn divergence_is_an_error_and_exports_nothing() {
        let mut problem = SquareRoot { max_iterations: 1 };
        let mut exporter = Captured::default();

        let error = solve(&mut problem, &1.0, &mut exporter).unwrap_err();

        assert!(matches!(error, Error::Diverged));
        assert!(exporter.0.is_empty());
    }
}
