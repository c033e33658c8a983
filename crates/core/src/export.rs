/// Describes the moment at which an exporter is consulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportContext {
    /// Simulated time of the accepted state.
    pub time: f64,

    /// Accepted step number (1 for the first accepted step, 0 for steady solves).
    pub step: usize,

    /// Whether the state comes from a steady solve.
    pub steady: bool,
}

impl ExportContext {
    /// Context for a state accepted by the transient driver.
    #[must_use]
    pub fn transient(time: f64, step: usize) -> Self {
        Self {
            time,
            step,
            steady: false,
        }
    }

    /// Context for the single state produced by a steady solve.
    #[must_use]
    pub fn steady() -> Self {
        Self {
            time: 0.0,
            step: 0,
            steady: true,
        }
    }
}

/// Writes derived quantities or field snapshots for accepted states.
///
/// The driver calls [`export`](Exporter::export) after every accepted step.
/// Each exporter owns its own schedule and decides whether anything is due;
/// when something is due, it must leave its sink flushed before returning.
///
/// The unit type `()` implements `Exporter` as a no-op for runs that write
/// nothing.
pub trait Exporter<S> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes whatever is due for `state` at `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if a due write fails. The driver aborts the run
    /// rather than dropping data.
    fn export(&mut self, state: &S, context: &ExportContext) -> Result<(), Self::Error>;

    /// Returns the next export target strictly after `time`, if any.
    ///
    /// The driver may shorten a step to land exactly on this time.
    fn next_time(&self, _time: f64) -> Option<f64> {
        None
    }
}

impl<S> Exporter<S> for () {
    type Error = std::convert::Infallible;

    fn export(&mut self, _state: &S, _context: &ExportContext) -> Result<(), Self::Error> {
        Ok(())
    }
}
