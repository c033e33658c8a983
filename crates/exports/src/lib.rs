//! Scheduled exports for permeate runs.
//!
//! - [`Schedule`] decides, per accepted step, whether an exporter is due and
//!   which target time comes next
//! - [`TxtExport`] writes a nodal field to `<label>_transient.txt` and
//!   `<label>_steady.txt`
//! - [`DerivedQuantities`] evaluates scalar quantities (surface fluxes, volume
//!   integrals and extrema) into a table
//! - [`Exports`] groups exporters so the driver can consult them together
//!
//! Files are created on the first due write, never at construction, and every
//! row is flushed before the driver solves past its time.

pub mod derived;

mod collection;
mod error;
mod schedule;
mod sink;
mod txt;

pub use collection::Exports;
pub use derived::{
    AverageVolume, Coefficient, DerivedQuantities, DerivedQuantity, HydrogenFlux, MaximumVolume,
    MinimumVolume, SurfaceFlux, TotalVolume,
};
pub use error::ExportError;
pub use schedule::{ExportTimes, Schedule};
pub use txt::TxtExport;
