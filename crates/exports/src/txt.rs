use std::path::{Path, PathBuf};

use permeate_core::{ExportContext, Exporter, Fields};

use crate::{
    ExportError, ExportTimes, Schedule,
    sink::{self, LazySink},
};

/// Writes a nodal field to text files.
///
/// Transient states go to `<folder>/<label>_transient.txt`, one row per due
/// export: the time followed by the field value at every vertex. The header
/// names the vertex coordinates (`t(s),x=0,x=0.1,...`).
///
/// A steady state overwrites `<folder>/<label>_steady.txt` with a two-column
/// `x,<label>` table.
#[derive(Debug)]
pub struct TxtExport {
    field: String,
    label: String,
    folder: PathBuf,
    schedule: Schedule,
    transient: LazySink,
    writes: usize,
}

impl TxtExport {
    pub fn new(
        field: impl Into<String>,
        label: impl Into<String>,
        folder: impl Into<PathBuf>,
        times: ExportTimes,
    ) -> Self {
        let label = label.into();
        let folder = folder.into();
        let transient = LazySink::new(folder.join(format!("{label}_transient.txt")));
        Self {
            field: field.into(),
            label,
            folder,
            schedule: Schedule::new(times),
            transient,
            writes: 0,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[must_use]
    pub fn transient_path(&self) -> &Path {
        self.transient.path()
    }

    #[must_use]
    pub fn steady_path(&self) -> PathBuf {
        self.folder.join(format!("{}_steady.txt", self.label))
    }

    /// Number of rows written to the transient file so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Writes the field if the schedule says so, or unconditionally for a
    /// steady state.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the state lacks the field or a file
    /// cannot be written.
    pub fn write<S: Fields + ?Sized>(
        &mut self,
        state: &S,
        context: &ExportContext,
    ) -> Result<(), ExportError> {
        if context.steady {
            return self.write_steady(state);
        }
        if !self.schedule.is_due(context.time) {
            return Ok(());
        }

        let view = state
            .field(&self.field)
            .ok_or_else(|| ExportError::MissingField(self.field.clone()))?;

        if self.schedule.is_it_first_write(context.time, self.writes) {
            let header = view
                .coordinates()
                .iter()
                .fold(String::from("t(s)"), |mut header, x| {
                    header.push_str(&format!(",x={x}"));
                    header
                });
            self.transient.start(&header)?;
        }
        self.transient
            .append(&sink::row(context.time, view.values.iter().copied()))?;
        self.writes += 1;
        Ok(())
    }

    fn write_steady<S: Fields + ?Sized>(&self, state: &S) -> Result<(), ExportError> {
        let view = state
            .field(&self.field)
            .ok_or_else(|| ExportError::MissingField(self.field.clone()))?;

        let mut contents = format!("x,{}\n", self.label);
        for (x, value) in view.coordinates().iter().zip(view.values) {
            contents.push_str(&format!("{x},{value:e}\n"));
        }
        sink::overwrite(&self.steady_path(), &contents)
    }
}

impl<S: Fields> Exporter<S> for TxtExport {
    type Error = ExportError;

    fn export(&mut self, state: &S, context: &ExportContext) -> Result<(), Self::Error> {
        self.write(state, context)
    }

    fn next_time(&self, time: f64) -> Option<f64> {
        self.schedule.when_is_next(time)
    }
}
