use super::{Mesh1D, MeshError};

/// Relative tolerance used to match a surface coordinate to a vertex.
const SURFACE_RTOL: f64 = 1e-5;

/// Absolute tolerance used to match a surface coordinate to a vertex.
const SURFACE_ATOL: f64 = 1e-8;

/// A volume subdomain of a 1D mesh, delimited by two borders.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeSubdomain1D {
    pub id: i32,
    pub borders: [f64; 2],
}

impl VolumeSubdomain1D {
    #[must_use]
    pub fn new(id: i32, borders: [f64; 2]) -> Self {
        Self { id, borders }
    }

    /// Locates the cells lying entirely within the borders.
    ///
    /// A cell belongs to the subdomain when both of its vertices satisfy
    /// `borders[0] <= x <= borders[1]`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidBorders`] if the borders are not finite or
    /// not in increasing order.
    pub fn locate_subdomain_entities(&self, mesh: &Mesh1D) -> Result<Vec<usize>, MeshError> {
        let [left, right] = self.borders;
        if !left.is_finite() || !right.is_finite() || left > right {
            return Err(MeshError::InvalidBorders {
                id: self.id,
                left,
                right,
            });
        }

        let inside = |x: f64| x >= left && x <= right;

        Ok(mesh
            .vertices()
            .windows(2)
            .enumerate()
            .filter_map(|(cell, pair)| (inside(pair[0]) && inside(pair[1])).then_some(cell))
            .collect())
    }
}

/// A surface subdomain of a 1D mesh: a single boundary vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceSubdomain1D {
    pub id: i32,
    pub x: f64,
}

impl SurfaceSubdomain1D {
    #[must_use]
    pub fn new(id: i32, x: f64) -> Self {
        Self { id, x }
    }

    /// Locates the boundary vertex at this surface's coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::SurfaceNotOnBoundary`] if neither end of the mesh
    /// lies at `x`.
    pub fn locate_boundary_facet(&self, mesh: &Mesh1D) -> Result<usize, MeshError> {
        let vertices = mesh.vertices();
        let last = vertices.len() - 1;

        [0, last]
            .into_iter()
            .find(|&index| is_close(vertices[index], self.x))
            .ok_or(MeshError::SurfaceNotOnBoundary {
                id: self.id,
                x: self.x,
            })
    }

    /// Returns the outward unit normal at this surface (`-1` on the left end,
    /// `+1` on the right end).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::SurfaceNotOnBoundary`] if the surface is not at
    /// either end of the mesh.
    pub fn outward_normal(&self, mesh: &Mesh1D) -> Result<f64, MeshError> {
        let vertex = self.locate_boundary_facet(mesh)?;
        Ok(if vertex == 0 { -1.0 } else { 1.0 })
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= SURFACE_ATOL + SURFACE_RTOL * b.abs()
}
