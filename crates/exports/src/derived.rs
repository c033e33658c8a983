//! Scalar quantities derived from the solution and written as a time series.
//!
//! Each [`DerivedQuantity`] reduces the state to one number (a surface flux,
//! a volume integral, an extremum). A [`DerivedQuantities`] table evaluates
//! all of its quantities when its schedule is due, keeps the rows in memory,
//! and optionally appends them to a file with a `t(s),<title>...` header.

mod surface;
mod volume;

pub use surface::{Coefficient, HydrogenFlux, SurfaceFlux};
pub use volume::{AverageVolume, MaximumVolume, MinimumVolume, TotalVolume};

use std::{fmt, path::PathBuf};

use permeate_core::{ExportContext, Exporter, Fields};

use crate::{ExportError, ExportTimes, Schedule, sink::LazySink};

/// A scalar computed from the fields of a state.
pub trait DerivedQuantity {
    /// Column title in the derived quantities table.
    fn title(&self) -> String;

    /// Evaluates the quantity.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if a required field is missing or a
    /// subdomain cannot be located on the field's mesh.
    fn compute(&self, fields: &dyn Fields) -> Result<f64, ExportError>;
}

/// A table of derived quantities, one row per due export.
pub struct DerivedQuantities {
    quantities: Vec<Box<dyn DerivedQuantity>>,
    schedule: Schedule,
    sink: Option<LazySink>,
    data: Vec<Vec<f64>>,
}

impl DerivedQuantities {
    /// Creates an empty table kept in memory only.
    #[must_use]
    pub fn new(times: ExportTimes) -> Self {
        Self {
            quantities: Vec::new(),
            schedule: Schedule::new(times),
            sink: None,
            data: Vec::new(),
        }
    }

    /// Also appends every row to the file at `path`, created on first write.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = Some(LazySink::new(path.into()));
        self
    }

    pub fn push(&mut self, quantity: impl DerivedQuantity + 'static) {
        self.quantities.push(Box::new(quantity));
    }

    /// Builder-style variant of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, quantity: impl DerivedQuantity + 'static) -> Self {
        self.push(quantity);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Column titles, starting with `t(s)`.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        std::iter::once("t(s)".to_owned())
            .chain(self.quantities.iter().map(|q| q.title()))
            .collect()
    }

    /// Rows written so far: the time followed by one value per quantity.
    #[must_use]
    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Evaluates and records every quantity if the schedule is due, or
    /// unconditionally for a steady state.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if a quantity cannot be evaluated or the
    /// file cannot be written. No row is recorded in that case.
    pub fn write<S: Fields>(
        &mut self,
        state: &S,
        context: &ExportContext,
    ) -> Result<(), ExportError> {
        if !context.steady && !self.schedule.is_due(context.time) {
            return Ok(());
        }

        let mut row = Vec::with_capacity(self.quantities.len() + 1);
        row.push(context.time);
        for quantity in &self.quantities {
            row.push(quantity.compute(state)?);
        }

        let first = if context.steady {
            self.sink.as_ref().is_some_and(|sink| !sink.is_open())
        } else {
            self.schedule.is_it_first_write(context.time, self.data.len())
        };
        let header = first.then(|| self.titles().join(","));
        if let Some(sink) = &mut self.sink {
            if let Some(header) = &header {
                sink.start(header)?;
            }
            sink.append(&crate::sink::row(row[0], row[1..].iter().copied()))?;
        }

        self.data.push(row);
        Ok(())
    }
}

impl fmt::Debug for DerivedQuantities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedQuantities")
            .field("titles", &self.titles())
            .field("schedule", &self.schedule)
            .field("rows", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl<S: Fields> Exporter<S> for DerivedQuantities {
    type Error = ExportError;

    fn export(&mut self, state: &S, context: &ExportContext) -> Result<(), Self::Error> {
        self.write(state, context)
    }

    fn next_time(&self, time: f64) -> Option<f64> {
        self.schedule.when_is_next(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use approx::assert_relative_eq;
    use permeate_core::{FieldView, Mesh1D, SurfaceSubdomain1D, VolumeSubdomain1D};
    use tempfile::tempdir;

    struct Uniform {
        mesh: Mesh1D,
        solute: Vec<f64>,
    }

    impl Uniform {
        fn at(level: f64) -> Self {
            Self {
                mesh: Mesh1D::uniform(0.0, 2.0, 4).unwrap(),
                solute: vec![level; 5],
            }
        }
    }

    impl Fields for Uniform {
        fn field(&self, name: &str) -> Option<FieldView<'_>> {
            (name == "solute")
                .then(|| FieldView::new(&self.mesh, &self.solute))
                .flatten()
        }
    }

    fn table(times: ExportTimes) -> DerivedQuantities {
        DerivedQuantities::new(times)
            .with(HydrogenFlux::new(
                SurfaceSubdomain1D::new(1, 0.0),
                Coefficient::Constant(1.0),
            ))
            .with(TotalVolume::new(
                "solute",
                VolumeSubdomain1D::new(1, [0.0, 2.0]),
            ))
    }

    #[test]
    fn rows_are_kept_in_memory() {
        let mut table = table(ExportTimes::EveryStep);

        table
            .write(&Uniform::at(1.0), &ExportContext::transient(0.5, 1))
            .unwrap();
        table
            .write(&Uniform::at(3.0), &ExportContext::transient(1.0, 2))
            .unwrap();

        assert_eq!(
            table.titles(),
            ["t(s)", "Flux surface 1: solute", "Total solute volume 1"]
        );
        assert_eq!(table.data().len(), 2);
        assert_relative_eq!(table.data()[1][0], 1.0);
        assert_relative_eq!(table.data()[1][1], 0.0);
        assert_relative_eq!(table.data()[1][2], 6.0);
    }

    #[test]
    fn file_gets_header_once_and_one_row_per_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results/derived_quantities.csv");
        let mut table = table(ExportTimes::discrete(vec![1.0, 2.0]).unwrap()).with_file(&path);

        for (step, time) in [0.5, 1.0, 1.5, 2.0, 2.5].into_iter().enumerate() {
            table
                .write(&Uniform::at(time), &ExportContext::transient(time, step + 1))
                .unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "t(s),Flux surface 1: solute,Total solute volume 1");
        assert!(lines[1].starts_with("1,") && lines[1].ends_with(",2e0"));
        assert!(lines[2].starts_with("2,") && lines[2].ends_with(",4e0"));
    }

    #[test]
    fn overshot_first_target_gets_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derived_quantities.csv");
        let mut table = table(ExportTimes::discrete(vec![1.0, 2.0]).unwrap()).with_file(&path);

        for (step, time) in [1.5, 2.5].into_iter().enumerate() {
            table
                .write(&Uniform::at(time), &ExportContext::transient(time, step + 1))
                .unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "t(s),Flux surface 1: solute,Total solute volume 1");
        assert!(lines[1].starts_with("1.5,"));
        assert!(lines[2].starts_with("2.5,"));
    }

    #[test]
    fn steady_state_is_always_written() {
        let mut table = table(ExportTimes::discrete(vec![10.0]).unwrap());
        table
            .write(&Uniform::at(2.0), &ExportContext::steady())
            .unwrap();
        assert_eq!(table.data().len(), 1);
    }

    #[test]
    fn failed_evaluation_records_nothing() {
        let mut table = DerivedQuantities::new(ExportTimes::EveryStep)
            .with(TotalVolume::new("T", VolumeSubdomain1D::new(1, [0.0, 2.0])));

        let error = table
            .write(&Uniform::at(1.0), &ExportContext::transient(1.0, 1))
            .unwrap_err();

        assert!(matches!(error, ExportError::MissingField(_)));
        assert!(table.data().is_empty());
    }
}
