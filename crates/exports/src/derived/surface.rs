use permeate_core::{Fields, SurfaceSubdomain1D};

use crate::ExportError;

use super::DerivedQuantity;

/// The transport coefficient multiplying the gradient in a surface flux.
#[derive(Debug, Clone, PartialEq)]
pub enum Coefficient {
    Constant(f64),

    /// A nodal field of the state, such as a temperature-dependent diffusivity.
    Field(String),
}

impl Coefficient {
    fn at(&self, fields: &dyn Fields, vertex: usize) -> Result<f64, ExportError> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Field(name) => fields
                .field(name)
                .and_then(|view| view.values.get(vertex).copied())
                .ok_or_else(|| ExportError::MissingField(name.clone())),
        }
    }
}

/// Flux of a field through a boundary surface, `-k ∇u · n`.
///
/// Positive values leave the domain. The gradient is taken on the boundary
/// cell, which is exact for linear elements.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFlux {
    field: String,
    surface: SurfaceSubdomain1D,
    coefficient: Coefficient,
}

impl SurfaceFlux {
    pub fn new(
        field: impl Into<String>,
        surface: SurfaceSubdomain1D,
        coefficient: Coefficient,
    ) -> Self {
        Self {
            field: field.into(),
            surface,
            coefficient,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceSubdomain1D {
        self.surface
    }
}

impl DerivedQuantity for SurfaceFlux {
    fn title(&self) -> String {
        format!("Flux surface {}: {}", self.surface.id, self.field)
    }

    fn compute(&self, fields: &dyn Fields) -> Result<f64, ExportError> {
        let view = fields
            .field(&self.field)
            .ok_or_else(|| ExportError::MissingField(self.field.clone()))?;

        let vertex = self.surface.locate_boundary_facet(view.mesh)?;
        let normal = self.surface.outward_normal(view.mesh)?;
        let neighbour = if vertex == 0 { 1 } else { vertex - 1 };

        let x = view.coordinates();
        let gradient =
            (view.values[vertex] - view.values[neighbour]) / (x[vertex] - x[neighbour]);

        Ok(-self.coefficient.at(fields, vertex)? * gradient * normal)
    }
}

/// Flux of mobile hydrogen (the `"solute"` field) through a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrogenFlux(SurfaceFlux);

impl HydrogenFlux {
    pub fn new(surface: SurfaceSubdomain1D, diffusivity: Coefficient) -> Self {
        Self(SurfaceFlux::new("solute", surface, diffusivity))
    }
}

impl DerivedQuantity for HydrogenFlux {
    fn title(&self) -> String {
        self.0.title()
    }

    fn compute(&self, fields: &dyn Fields) -> Result<f64, ExportError> {
        self.0.compute(fields)
    }
}
