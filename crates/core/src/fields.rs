use crate::Mesh1D;

/// A borrowed view of a nodal field on a 1D mesh.
///
/// `values[i]` is the field value at `mesh.vertices()[i]`.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub mesh: &'a Mesh1D,
    pub values: &'a [f64],
}

impl<'a> FieldView<'a> {
    /// Creates a view, returning `None` if the value count does not match the
    /// number of mesh vertices.
    #[must_use]
    pub fn new(mesh: &'a Mesh1D, values: &'a [f64]) -> Option<Self> {
        (values.len() == mesh.vertices().len()).then_some(Self { mesh, values })
    }

    /// Returns the vertex coordinates the values live on.
    #[must_use]
    pub fn coordinates(&self) -> &'a [f64] {
        self.mesh.vertices()
    }
}

/// Exposes named nodal fields of a solution state.
///
/// Exporters look fields up by name (for example `"solute"`, `"1"` for the
/// first trap, or `"T"`), so a state type only needs to implement this trait
/// to become exportable.
pub trait Fields {
    /// Returns the field called `name`, or `None` if the state has no such field.
    fn field(&self, name: &str) -> Option<FieldView<'_>>;
}
