use thiserror::Error;

/// Errors that can occur when creating a [`Stepsize`](super::Stepsize).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum StepsizeError {
    #[error("stepsize must be finite and positive, got {0}")]
    NotPositive(f64),

    #[error("initial stepsize {dt} is below dt_min {dt_min}")]
    BelowMinimum { dt: f64, dt_min: f64 },

    #[error("initial stepsize {dt} is above dt_max {dt_max}")]
    AboveMaximum { dt: f64, dt_max: f64 },
}

/// Errors returned when a step size cannot be reduced after a divergence.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ShrinkError {
    #[error("stepsize {dt:e} fell below the minimum {dt_min:e}")]
    TooSmall { dt: f64, dt_min: f64 },

    #[error("fixed stepsize {dt} cannot be reduced")]
    NotAdaptive { dt: f64 },
}
