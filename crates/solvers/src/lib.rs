//! Solvers for permeate problems.
//!
//! - [`transient`] — adaptive implicit time stepping of a [`TransientProblem`],
//!   with step retries on divergence and scheduled exports
//! - [`steady`] — a single steady-state solve with steady exports
//!
//! [`TransientProblem`]: permeate_core::TransientProblem

pub mod steady;
pub mod transient;
