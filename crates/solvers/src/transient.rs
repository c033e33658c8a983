//! Solvers for transient problems — advancing a state through time.
//!
//! A [`TransientProblem`] attempts one implicit step at a time. The
//! [`adaptive`] driver decides the step size with a [`Stepsize`] controller,
//! retries diverged steps with a smaller step, and hands accepted states to an
//! exporter.
//!
//! [`TransientProblem`]: permeate_core::TransientProblem

mod clock;

pub mod adaptive;
pub mod stepsize;

pub use stepsize::{AdaptivePolicy, Stepsize};
