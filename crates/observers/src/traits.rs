//! Capability traits for observers that work across solvers.
//!
//! These traits abstract over solver-specific event and action types, so an
//! observer can be written once and used with any driver whose types
//! implement them.
//!
//! # Event traits
//!
//! - [`HasTime`] — events that carry a simulated time
//! - [`HasIterations`] — events that may carry a nonlinear iteration count
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use permeate_core::Observer;
//! use permeate_observers::traits::{CanStopEarly, HasTime};
//!
//! struct StopAt(f64);
//!
//! impl<E: HasTime, A: CanStopEarly> Observer<E, A> for StopAt {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.time() >= self.0).then(A::stop_early)
//!     }
//! }
//! ```

use permeate_solvers::transient::adaptive;

/// An event that carries a simulated time.
pub trait HasTime {
    /// Returns the simulated time for this event.
    fn time(&self) -> f64;
}

/// An event that may carry a nonlinear iteration count.
pub trait HasIterations {
    /// Returns the iteration count, or `None` if the solve did not converge.
    fn iterations(&self) -> Option<usize>;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl<S> HasTime for adaptive::Event<'_, S> {
    fn time(&self) -> f64 {
        adaptive::Event::time(self)
    }
}

impl<S> HasIterations for adaptive::Event<'_, S> {
    fn iterations(&self) -> Option<usize> {
        match self {
            adaptive::Event::Accepted { iterations, .. } => Some(*iterations),
            adaptive::Event::Diverged { .. } => None,
        }
    }
}

impl CanStopEarly for adaptive::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
