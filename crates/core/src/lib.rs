//! Core traits and types for permeate.
//!
//! This crate defines the shared abstractions that the time-stepping driver,
//! exporters, and observers build on:
//!
//! - [`TransientProblem`] — the narrow interface to an external nonlinear solve
//!   that attempts one time step at a time
//! - [`SteadyProblem`] — a single nonlinear solve without time dependence
//! - [`SolveOutcome`], [`CouplingOutcome`] — what a solve attempt reports back
//! - [`Exporter`] — receives accepted states and writes what is due
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`TimeDependentRegistry`] — terms re-evaluated at each attempted time
//! - [`Fields`], [`Mesh1D`] — nodal field access used by exports

pub mod mesh;

mod export;
mod fields;
mod observer;
mod outcome;
mod problems;
mod time_dependent;

pub use export::{ExportContext, Exporter};
pub use fields::{FieldView, Fields};
pub use mesh::{Mesh1D, MeshError, SurfaceSubdomain1D, TaggedMesh, VolumeSubdomain1D};
pub use observer::Observer;
pub use outcome::{CouplingOutcome, SolveOutcome};
pub use problems::{SteadyProblem, TransientProblem};
pub use time_dependent::{TimeDependent, TimeDependentRegistry, TimeExpression, TimeValue};
