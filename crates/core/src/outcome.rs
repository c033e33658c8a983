/// The result of one attempt by an external nonlinear solver.
///
/// A converged attempt hands back the new state together with the number of
/// Newton iterations it took. A diverged attempt carries nothing: the caller
/// still owns the previous state and retries from it.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome<S> {
    /// The solver converged to `state` in `iterations` iterations.
    Converged { state: S, iterations: usize },

    /// The solver failed to converge.
    Diverged,
}

impl<S> SolveOutcome<S> {
    /// Creates a converged outcome.
    pub fn converged(state: S, iterations: usize) -> Self {
        Self::Converged { state, iterations }
    }

    /// Returns `true` if the attempt converged.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Returns the iteration count of a converged attempt.
    #[must_use]
    pub fn iterations(&self) -> Option<usize> {
        match self {
            Self::Converged { iterations, .. } => Some(*iterations),
            Self::Diverged => None,
        }
    }
}

/// The result of solving a coupled field (typically temperature) before the
/// main transport solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingOutcome {
    /// No coupled field is configured.
    Skipped,

    /// The coupled solve converged in `iterations` iterations.
    Converged { iterations: usize },

    /// The coupled solve failed to converge.
    Diverged,
}
