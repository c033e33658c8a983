/// Events emitted by the adaptive driver.
///
/// `Accepted` is emitted once per accepted step, after the exporter has
/// written whatever was due. `Diverged` is emitted once per rejected attempt,
/// after the step size has been reduced for the retry.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a, S> {
    /// A step converged and the clock advanced.
    Accepted {
        /// Accepted step number, starting at 1.
        step: usize,

        /// Time reached by the step.
        time: f64,

        /// Step size used.
        dt: f64,

        /// Nonlinear iterations the solver needed.
        iterations: usize,

        /// Step size proposed for the next step.
        next_dt: f64,

        /// The accepted state.
        state: &'a S,
    },

    /// A step attempt diverged and will be retried from the same time.
    Diverged {
        /// Time the attempt started from (unchanged by the failure).
        time: f64,

        /// Step size that diverged.
        dt: f64,

        /// Consecutive retries from this time, starting at 1.
        retry: usize,

        /// Reduced step size for the retry.
        next_dt: f64,
    },
}

impl<S> Event<'_, S> {
    /// Returns the simulated time associated with the event.
    #[must_use]
    pub fn time(&self) -> f64 {
        match self {
            Self::Accepted { time, .. } | Self::Diverged { time, .. } => *time,
        }
    }

    /// Returns the step size the event refers to.
    #[must_use]
    pub fn dt(&self) -> f64 {
        match self {
            Self::Accepted { dt, .. } | Self::Diverged { dt, .. } => *dt,
        }
    }
}
