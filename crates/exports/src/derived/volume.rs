use permeate_core::{FieldView, Fields, VolumeSubdomain1D};

use crate::ExportError;

use super::DerivedQuantity;

/// Defines a volume quantity: a named reduction of a field over the cells of
/// a volume subdomain.
macro_rules! volume_quantity {
    ($(#[$doc:meta])* $name:ident, $title:literal, $reduce:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            field: String,
            volume: VolumeSubdomain1D,
        }

        impl $name {
            pub fn new(field: impl Into<String>, volume: VolumeSubdomain1D) -> Self {
                Self {
                    field: field.into(),
                    volume,
                }
            }
        }

        impl DerivedQuantity for $name {
            fn title(&self) -> String {
                format!("{} {} volume {}", $title, self.field, self.volume.id)
            }

            fn compute(&self, fields: &dyn Fields) -> Result<f64, ExportError> {
                let view = fields
                    .field(&self.field)
                    .ok_or_else(|| ExportError::MissingField(self.field.clone()))?;
                let cells = self.volume.locate_subdomain_entities(view.mesh)?;
                if cells.is_empty() {
                    return Err(ExportError::EmptyVolume(self.volume.id));
                }
                Ok($reduce(&view, &cells))
            }
        }
    };
}

volume_quantity!(
    /// Integral of a field over a volume (trapezoidal, exact for linear elements).
    TotalVolume,
    "Total",
    integral
);

volume_quantity!(
    /// Volume average of a field.
    AverageVolume,
    "Average",
    average
);

volume_quantity!(
    /// Largest nodal value of a field within a volume.
    MaximumVolume,
    "Maximum",
    maximum
);

volume_quantity!(
    /// Smallest nodal value of a field within a volume.
    MinimumVolume,
    "Minimum",
    minimum
);

fn integral(view: &FieldView<'_>, cells: &[usize]) -> f64 {
    let x = view.coordinates();
    let u = view.values;
    cells
        .iter()
        .map(|&i| 0.5 * (u[i] + u[i + 1]) * (x[i + 1] - x[i]))
        .sum()
}

fn average(view: &FieldView<'_>, cells: &[usize]) -> f64 {
    let x = view.coordinates();
    let length: f64 = cells.iter().map(|&i| x[i + 1] - x[i]).sum();
    integral(view, cells) / length
}

fn maximum(view: &FieldView<'_>, cells: &[usize]) -> f64 {
    nodal_values(view, cells).fold(f64::NEG_INFINITY, f64::max)
}

fn minimum(view: &FieldView<'_>, cells: &[usize]) -> f64 {
    nodal_values(view, cells).fold(f64::INFINITY, f64::min)
}

fn nodal_values<'a>(view: &'a FieldView<'_>, cells: &'a [usize]) -> impl Iterator<Item = f64> + 'a {
    let values = view.values;
    cells.iter().flat_map(move |&i| [values[i], values[i + 1]])
}
