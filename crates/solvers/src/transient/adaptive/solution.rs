/// Indicates how the driver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the final time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// A record of one accepted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Time reached by the step.
    pub time: f64,

    /// Step size used.
    pub dt: f64,

    /// Nonlinear iterations the solver needed.
    pub iterations: usize,
}

/// The result of an adaptive transient run.
#[derive(Debug, Clone)]
pub struct Solution<S> {
    /// How the driver terminated.
    pub status: Status,

    /// The last accepted state.
    pub state: S,

    /// Time of the last accepted state.
    pub time: f64,

    /// Step size the controller would propose next.
    pub dt: f64,

    /// Number of accepted steps.
    pub steps: usize,

    /// Number of diverged attempts over the whole run.
    pub retries: usize,

    /// One record per accepted step, in time order.
    pub history: Vec<StepRecord>,
}
