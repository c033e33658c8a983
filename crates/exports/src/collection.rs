use std::fmt;

use permeate_core::{ExportContext, Exporter};

use crate::ExportError;

/// Every exporter of a run, consulted together by the driver.
///
/// The next target time of the collection is the earliest next target of
/// its members.
pub struct Exports<S> {
    exporters: Vec<Box<dyn Exporter<S, Error = ExportError>>>,
}

impl<S> Exports<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            exporters: Vec::new(),
        }
    }

    pub fn push(&mut self, exporter: impl Exporter<S, Error = ExportError> + 'static) {
        self.exporters.push(Box::new(exporter));
    }

    /// Builder-style variant of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, exporter: impl Exporter<S, Error = ExportError> + 'static) -> Self {
        self.push(exporter);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

impl<S> Default for Exports<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Exports<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exports")
            .field("exporters", &self.exporters.len())
            .finish()
    }
}

impl<S> Exporter<S> for Exports<S> {
    type Error = ExportError;

    fn export(&mut self, state: &S, context: &ExportContext) -> Result<(), Self::Error> {
        self.exporters
            .iter_mut()
            .try_for_each(|exporter| exporter.export(state, context))
    }

    fn next_time(&self, time: f64) -> Option<f64> {
        self.exporters
            .iter()
            .filter_map(|exporter| exporter.next_time(time))
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use permeate_core::{FieldView, Fields, Mesh1D, VolumeSubdomain1D};
    use tempfile::tempdir;

    use crate::{DerivedQuantities, ExportTimes, TotalVolume, TxtExport};

    struct Flat {
        mesh: Mesh1D,
        values: Vec<f64>,
    }

    impl Fields for Flat {
        fn field(&self, name: &str) -> Option<FieldView<'_>> {
            (name == "solute")
                .then(|| FieldView::new(&self.mesh, &self.values))
                .flatten()
        }
    }

    fn flat() -> Flat {
        Flat {
            mesh: Mesh1D::uniform(0.0, 1.0, 2).unwrap(),
            values: vec![1.0; 3],
        }
    }

    #[test]
    fn next_time_is_earliest_member_target() {
        let dir = tempdir().unwrap();
        let exports: Exports<Flat> = Exports::new()
            .with(TxtExport::new(
                "solute",
                "mobile",
                dir.path(),
                ExportTimes::discrete(vec![2.0, 4.0]).unwrap(),
            ))
            .with(DerivedQuantities::new(
                ExportTimes::discrete(vec![3.0]).unwrap(),
            ))
            .with(DerivedQuantities::new(ExportTimes::EveryStep));

        assert_eq!(exports.len(), 3);
        assert_eq!(exports.next_time(0.0), Some(2.0));
        assert_eq!(exports.next_time(2.0), Some(3.0));
        assert_eq!(exports.next_time(3.0), Some(4.0));
        assert_eq!(exports.next_time(4.0), None);
    }

    #[test]
    fn every_member_is_written() {
        let dir = tempdir().unwrap();
        let mut exports: Exports<Flat> = Exports::new()
            .with(TxtExport::new(
                "solute",
                "mobile",
                dir.path(),
                ExportTimes::EveryStep,
            ))
            .with(
                DerivedQuantities::new(ExportTimes::EveryStep)
                    .with(TotalVolume::new("solute", VolumeSubdomain1D::new(1, [0.0, 1.0])))
                    .with_file(dir.path().join("derived_quantities.csv")),
            );

        exports
            .export(&flat(), &ExportContext::transient(0.1, 1))
            .unwrap();

        assert!(dir.path().join("mobile_transient.txt").exists());
        assert!(dir.path().join("derived_quantities.csv").exists());
    }

    #[test]
    fn empty_collection_is_a_no_op() {
        let mut exports: Exports<Flat> = Exports::default();
        assert!(exports.is_empty());
        exports
            .export(&flat(), &ExportContext::transient(1.0, 1))
            .unwrap();
        assert_eq!(exports.next_time(0.0), None);
    }
}
