//! Reusable observers for permeate runs.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with any driver whose events and actions implement them.
//!
//! - [`traits`] — capability traits ([`HasTime`], [`HasIterations`],
//!   [`CanStopEarly`])
//! - [`ProgressLogger`] — logs progress as a percentage of the final time
//! - [`WallClockLimit`] — stops a run that exceeds a wall-time budget
//!
//! [`Observer`]: permeate_core::Observer
//! [`HasTime`]: traits::HasTime
//! [`HasIterations`]: traits::HasIterations
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod progress;
mod wall_clock;

pub use progress::ProgressLogger;
pub use wall_clock::WallClockLimit;
