//! One-dimensional meshes and subdomain tagging.
//!
//! Meshes are normally built by the external finite-element library and only
//! passed through to the solve adapter. The 1D mesh here is enough for the
//! exporters to locate surfaces and volumes and compute derived quantities.

mod subdomain;

use thiserror::Error;

pub use subdomain::{SurfaceSubdomain1D, VolumeSubdomain1D};

/// Errors that can occur when building or tagging a mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("a 1D mesh needs at least two vertices, got {0}")]
    TooFewVertices(usize),

    #[error("mesh vertex is not finite: {0}")]
    NonFiniteVertex(f64),

    #[error("mesh has a duplicated vertex at x = {0}")]
    DuplicateVertex(f64),

    #[error("surface {id} at x = {x} is not on the mesh boundary")]
    SurfaceNotOnBoundary { id: i32, x: f64 },

    #[error("volume subdomain {id} has invalid borders [{left}, {right}]")]
    InvalidBorders { id: i32, left: f64, right: f64 },
}

/// A 1D mesh defined by its vertex coordinates.
///
/// Cell `i` spans `[vertices[i], vertices[i + 1]]`. Vertices are stored sorted
/// in increasing order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct Mesh1D {
    vertices: Vec<f64>,
}

impl Mesh1D {
    /// Creates a mesh from vertex coordinates given in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if there are fewer than two vertices, a vertex
    /// is not finite, or two vertices coincide.
    pub fn new(vertices: impl Into<Vec<f64>>) -> Result<Self, MeshError> {
        let mut vertices = vertices.into();

        if vertices.len() < 2 {
            return Err(MeshError::TooFewVertices(vertices.len()));
        }
        if let Some(&x) = vertices.iter().find(|x| !x.is_finite()) {
            return Err(MeshError::NonFiniteVertex(x));
        }

        vertices.sort_by(f64::total_cmp);

        #[allow(clippy::float_cmp)]
        if let Some(pair) = vertices.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(MeshError::DuplicateVertex(pair[0]));
        }

        Ok(Self { vertices })
    }

    /// Creates a uniform mesh of `cells` cells on `[left, right]`.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if `cells` is zero or the interval is degenerate.
    pub fn uniform(left: f64, right: f64, cells: usize) -> Result<Self, MeshError> {
        if cells == 0 {
            return Err(MeshError::TooFewVertices(1));
        }
        #[allow(clippy::cast_precision_loss)]
        let h = (right - left) / cells as f64;
        #[allow(clippy::cast_precision_loss)]
        let vertices: Vec<f64> = (0..=cells).map(|i| left + h * i as f64).collect();
        Self::new(vertices)
    }

    /// Returns the sorted vertex coordinates.
    #[must_use]
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Returns the `[left, right]` coordinates of cell `index`.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<[f64; 2]> {
        let left = *self.vertices.get(index)?;
        let right = *self.vertices.get(index + 1)?;
        Some([left, right])
    }

    /// Topological dimension of the cells.
    #[must_use]
    pub fn vdim(&self) -> usize {
        1
    }

    /// Topological dimension of the facets.
    #[must_use]
    pub fn fdim(&self) -> usize {
        self.vdim() - 1
    }

    /// Tags cells and boundary facets with subdomain ids.
    ///
    /// Cells not covered by any volume subdomain get tag `0`. When volume
    /// subdomains overlap, the one listed last wins.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if a subdomain is invalid or a surface is not on
    /// the boundary.
    pub fn tag(
        self,
        volumes: &[VolumeSubdomain1D],
        surfaces: &[SurfaceSubdomain1D],
    ) -> Result<TaggedMesh, MeshError> {
        let mut volume_tags = vec![0; self.num_cells()];
        for volume in volumes {
            for cell in volume.locate_subdomain_entities(&self)? {
                volume_tags[cell] = volume.id;
            }
        }

        let surface_tags = surfaces
            .iter()
            .map(|surface| Ok((surface.locate_boundary_facet(&self)?, surface.id)))
            .collect::<Result<Vec<_>, MeshError>>()?;

        Ok(TaggedMesh {
            mesh: self,
            volume_tags,
            surface_tags,
        })
    }
}

impl TryFrom<Vec<f64>> for Mesh1D {
    type Error = MeshError;

    fn try_from(vertices: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Mesh1D> for Vec<f64> {
    fn from(mesh: Mesh1D) -> Self {
        mesh.vertices
    }
}

/// A mesh together with its volume and surface markers.
///
/// The core never interprets tags; it hands them to the solve adapter and to
/// exporters that integrate over a subdomain.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedMesh {
    pub mesh: Mesh1D,

    /// Volume tag of each cell.
    pub volume_tags: Vec<i32>,

    /// `(vertex index, surface id)` pairs for tagged boundary facets.
    pub surface_tags: Vec<(usize, i32)>,
}

impl TaggedMesh {
    /// Returns the indices of the cells tagged `id`.
    #[must_use]
    pub fn cells_tagged(&self, id: i32) -> Vec<usize> {
        self.volume_tags
            .iter()
            .enumerate()
            .filter_map(|(cell, &tag)| (tag == id).then_some(cell))
            .collect()
    }

    /// Returns the vertex index of the facet tagged `id`.
    #[must_use]
    pub fn facet_tagged(&self, id: i32) -> Option<usize> {
        self.surface_tags
            .iter()
            .find_map(|&(vertex, tag)| (tag == id).then_some(vertex))
    }
}
