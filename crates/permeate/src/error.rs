use std::{io, path::PathBuf};

use permeate_exports::ExportError;
use permeate_solvers::{
    steady,
    transient::{
        adaptive,
        stepsize::{PolicyError, StepsizeError},
    },
};
use thiserror::Error;

/// Errors raised while loading or interpreting [`Parameters`](crate::Parameters).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported parameter file `{}` (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("missing parameter `{0}`")]
    Missing(&'static str),

    #[error("invalid parameters: {0}")]
    Invalid(&'static str),

    #[error("invalid adaptive stepsize: {0}")]
    Policy(#[from] PolicyError),

    #[error("invalid initial stepsize: {0}")]
    Stepsize(#[from] StepsizeError),
}

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up exports: {0}")]
    Export(#[from] ExportError),

    #[error("transient run failed: {0}")]
    Transient(#[from] adaptive::Error),

    #[error("steady run failed: {0}")]
    Steady(#[from] steady::Error),
}
