use std::{io, path::PathBuf};

use permeate_core::MeshError;
use thiserror::Error;

/// Errors raised while building exporters or writing their output.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state has no field named `{0}`")]
    MissingField(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("export time must be finite, got {0}")]
    InvalidTime(f64),

    #[error("volume subdomain {0} contains no cells")]
    EmptyVolume(i32),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
