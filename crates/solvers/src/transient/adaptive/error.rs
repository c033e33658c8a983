use std::error::Error as StdError;

use thiserror::Error;

use crate::transient::stepsize::ShrinkError;

/// Errors that abort an adaptive transient run.
///
/// A diverged step is not an error: the driver shrinks the step and retries.
/// These variants cover the cases where it cannot or must not continue.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("stepsize {dt:e} fell below the minimum {dt_min:e} at t = {time} s")]
    StepTooSmall { time: f64, dt: f64, dt_min: f64 },

    #[error("step of {dt:e} s does not advance t = {time} s")]
    Stalled { time: f64, dt: f64 },

    #[error("step of fixed size {dt} diverged at t = {time} s")]
    FixedStepDiverged { time: f64, dt: f64 },

    #[error("coupled solve diverged at t = {time} s")]
    CouplingSolveFailed { time: f64 },

    #[error("step from t = {time} s diverged {retries} consecutive times (last dt = {dt:e})")]
    RetryLimit { time: f64, dt: f64, retries: usize },

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),

    #[error("export failed at t = {time} s: {source}")]
    Export {
        time: f64,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn problem<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Problem(Box::new(err))
    }

    pub(crate) fn export<E: StdError + Send + Sync + 'static>(err: E, time: f64) -> Self {
        Self::Export {
            time,
            source: Box::new(err),
        }
    }

    pub(crate) fn shrink(err: ShrinkError, time: f64) -> Self {
        match err {
            ShrinkError::TooSmall { dt, dt_min } => Self::StepTooSmall { time, dt, dt_min },
            ShrinkError::NotAdaptive { dt } => Self::FixedStepDiverged { time, dt },
        }
    }
}
