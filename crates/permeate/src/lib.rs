//! Adaptive time stepping and scheduled exports for hydrogen transport
//! simulations.
//!
//! This crate wires the workspace together:
//!
//! - [`Parameters`] — run settings loaded from TOML or JSON
//! - [`Simulation`] — builds exports from the parameters and runs a
//!   [`TransientProblem`] or [`SteadyProblem`]
//! - [`logging`] — installs a `tracing` subscriber at the configured level
//!
//! The building blocks are re-exported as [`core`], [`exports`],
//! [`observers`], and [`solvers`].
//!
//! # Example
//!
//! ```ignore
//! use permeate::{Parameters, Simulation, logging};
//!
//! let parameters = Parameters::from_path("parameters.toml")?;
//! logging::init(parameters.log_level)?;
//!
//! let mut simulation = Simulation::new(parameters)?;
//! let solution = simulation.run(&mut problem, initial_state)?;
//! ```
//!
//! [`TransientProblem`]: permeate_core::TransientProblem
//! [`SteadyProblem`]: permeate_core::SteadyProblem

pub mod config;
pub mod logging;

mod error;
mod run;

pub use config::Parameters;
pub use error::{ConfigError, RunError};
pub use logging::LogLevel;
pub use run::Simulation;

pub use permeate_core as core;
pub use permeate_exports as exports;
pub use permeate_observers as observers;
pub use permeate_solvers as solvers;
