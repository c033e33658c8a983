//! Run parameters, loaded from TOML or JSON.
//!
//! ```toml
//! log_level = "info"
//!
//! [solving]
//! final_time = 100.0
//! initial_stepsize = 0.5
//!
//! [solving.adaptive_stepsize]
//! stepsize_change_ratio = 1.1
//! dt_min = 1e-5
//! t_stop = 80.0
//! stepsize_stop_max = 1.0
//!
//! [[exports.txt]]
//! field = "solute"
//! label = "mobile"
//! folder = "results"
//! times = [10.0, 50.0, 100.0]
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use permeate_core::{Fields, SurfaceSubdomain1D, VolumeSubdomain1D};
use permeate_exports::{
    AverageVolume, Coefficient, DerivedQuantities, ExportError, ExportTimes, Exports,
    HydrogenFlux, MaximumVolume, MinimumVolume, SurfaceFlux, TotalVolume, TxtExport,
};
use permeate_solvers::transient::{
    AdaptivePolicy, Stepsize, adaptive,
    stepsize::{DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_ITERATIONS},
};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogLevel};

/// Everything needed to set up a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub solving: Solving,

    #[serde(default)]
    pub exports: ExportsConfig,

    #[serde(default)]
    pub log_level: LogLevel,
}

/// Time stepping and nonlinear solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Solving {
    /// Required for transient runs.
    #[serde(default)]
    pub final_time: Option<f64>,

    /// Required for transient runs.
    #[serde(default)]
    pub initial_stepsize: Option<f64>,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default)]
    pub hit_export_times: bool,

    /// Absent for a fixed stepsize.
    #[serde(default)]
    pub adaptive_stepsize: Option<AdaptiveStepsize>,

    #[serde(default)]
    pub newton_solver: NewtonSolver,
}

fn default_max_retries() -> usize {
    adaptive::DEFAULT_MAX_RETRIES
}

/// Adaptive stepsize settings.
///
/// Either `stepsize_change_ratio` (grow by `r`, shrink by `1 / r`) or both
/// `growth_factor` and `shrink_factor` must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdaptiveStepsize {
    #[serde(default)]
    pub stepsize_change_ratio: Option<f64>,

    #[serde(default)]
    pub growth_factor: Option<f64>,

    #[serde(default)]
    pub shrink_factor: Option<f64>,

    #[serde(default)]
    pub min_iterations: Option<usize>,

    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Time after which the stepsize no longer grows.
    #[serde(default)]
    pub t_stop: Option<f64>,

    /// Stepsize cap applied after `t_stop`.
    #[serde(default)]
    pub stepsize_stop_max: Option<f64>,

    pub dt_min: f64,

    #[serde(default)]
    pub dt_max: Option<f64>,
}

/// Settings handed through to the nonlinear solver of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewtonSolver {
    pub absolute_tolerance: f64,
    pub relative_tolerance: f64,
    pub maximum_iterations: usize,
}

impl Default for NewtonSolver {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-10,
            relative_tolerance: 1e-10,
            maximum_iterations: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportsConfig {
    pub txt: Vec<TxtConfig>,
    pub derived_quantities: Option<DerivedQuantitiesConfig>,
}

/// A field written to `<folder>/<label>_transient.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxtConfig {
    pub field: String,
    pub label: String,
    pub folder: PathBuf,

    /// Target times; every step when absent.
    #[serde(default)]
    pub times: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivedQuantitiesConfig {
    /// Table file; kept in memory only when absent.
    pub filename: Option<PathBuf>,
    pub times: Option<Vec<f64>>,
    pub surface_fluxes: Vec<SurfaceFluxConfig>,
    pub volume_quantities: Vec<VolumeQuantityConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceFluxConfig {
    /// Defaults to the mobile hydrogen field, `"solute"`.
    #[serde(default = "default_flux_field")]
    pub field: String,
    pub surface: SurfaceSubdomain1D,

    /// A number, or the name of a nodal field.
    pub coefficient: CoefficientConfig,
}

fn default_flux_field() -> String {
    "solute".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoefficientConfig {
    Constant(f64),
    Field(String),
}

impl From<CoefficientConfig> for Coefficient {
    fn from(config: CoefficientConfig) -> Self {
        match config {
            CoefficientConfig::Constant(value) => Coefficient::Constant(value),
            CoefficientConfig::Field(name) => Coefficient::Field(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeQuantityConfig {
    pub kind: VolumeKind,
    pub field: String,
    pub volume: VolumeSubdomain1D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    Total,
    Average,
    Maximum,
    Minimum,
}

impl Parameters {
    /// Parses and validates TOML parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text does not parse or the parameters
    /// are inconsistent.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let parameters: Self = toml::from_str(text)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Parses and validates JSON parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text does not parse or the parameters
    /// are inconsistent.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let parameters: Self = serde_json::from_str(text)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Loads parameters from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, has another
    /// extension, or does not hold valid parameters.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str());
        let read = || {
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })
        };

        match extension {
            Some("toml") => Self::from_toml_str(&read()?),
            Some("json") => Self::from_json_str(&read()?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_owned())),
        }
    }

    /// Checks the parameters that can be checked without a problem at hand.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solving.initial_stepsize.is_some() {
            self.stepsize()?;
        } else if self.solving.adaptive_stepsize.is_some() {
            self.policy()?;
        }
        if self.solving.final_time.is_some() {
            self.driver_config()?;
        }
        Ok(())
    }

    /// Builds the stepsize controller.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `initial_stepsize` is missing or the
    /// adaptive settings are invalid.
    pub fn stepsize(&self) -> Result<Stepsize, ConfigError> {
        let dt = self
            .solving
            .initial_stepsize
            .ok_or(ConfigError::Missing("solving.initial_stepsize"))?;

        Ok(match self.policy()? {
            Some(policy) => Stepsize::adaptive(dt, policy)?,
            None => Stepsize::fixed(dt)?,
        })
    }

    /// Builds the adaptive policy, or `None` for a fixed stepsize.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the growth settings are missing or
    /// ambiguous, or a bound is invalid.
    pub fn policy(&self) -> Result<Option<AdaptivePolicy>, ConfigError> {
        let Some(settings) = &self.solving.adaptive_stepsize else {
            return Ok(None);
        };

        let (growth, shrink) = match (
            settings.stepsize_change_ratio,
            settings.growth_factor,
            settings.shrink_factor,
        ) {
            (Some(ratio), None, None) => (ratio, ratio.recip()),
            (None, Some(growth), Some(shrink)) => (growth, shrink),
            (Some(_), _, _) => {
                return Err(ConfigError::Invalid(
                    "give either stepsize_change_ratio or growth_factor and shrink_factor",
                ));
            }
            (None, _, _) => {
                return Err(ConfigError::Missing(
                    "solving.adaptive_stepsize.stepsize_change_ratio",
                ));
            }
        };

        let band = [
            settings.min_iterations.unwrap_or(DEFAULT_MIN_ITERATIONS),
            settings.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        ];
        let mut policy = AdaptivePolicy::new(growth, shrink, band, settings.dt_min)?;

        if let Some(dt_max) = settings.dt_max {
            policy = policy.with_dt_max(dt_max)?;
        }
        match (settings.t_stop, settings.stepsize_stop_max) {
            (Some(t_stop), cap) => {
                policy = policy.with_stopping_time(t_stop)?;
                if let Some(cap) = cap {
                    policy = policy.with_max_after_stop(cap)?;
                }
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid("stepsize_stop_max requires t_stop"));
            }
            (None, None) => {}
        }

        Ok(Some(policy))
    }

    /// Builds the transient driver config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `final_time` is missing or not positive.
    pub fn driver_config(&self) -> Result<adaptive::Config, ConfigError> {
        let final_time = self
            .solving
            .final_time
            .ok_or(ConfigError::Missing("solving.final_time"))?;
        if !(final_time > 0.0) {
            return Err(ConfigError::Invalid("solving.final_time must be positive"));
        }

        let config = adaptive::Config {
            max_retries: self.solving.max_retries,
            hit_export_times: self.solving.hit_export_times,
            ..adaptive::Config::new(final_time)
        };
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Builds the field exports listed under `exports.txt`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if export times are not finite.
    pub fn txt_exports<S: Fields + 'static>(&self) -> Result<Exports<S>, ExportError> {
        self.exports
            .txt
            .iter()
            .try_fold(Exports::new(), |exports, txt| {
                let times = ExportTimes::from_option(txt.times.clone())?;
                Ok(exports.with(TxtExport::new(
                    txt.field.clone(),
                    txt.label.clone(),
                    txt.folder.clone(),
                    times,
                )))
            })
    }

    /// Builds the derived quantities table, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if export times are not finite.
    pub fn derived_quantities(&self) -> Result<Option<DerivedQuantities>, ExportError> {
        let Some(config) = &self.exports.derived_quantities else {
            return Ok(None);
        };

        let mut table = DerivedQuantities::new(ExportTimes::from_option(config.times.clone())?);
        if let Some(filename) = &config.filename {
            table = table.with_file(filename.clone());
        }

        for flux in &config.surface_fluxes {
            let coefficient = Coefficient::from(flux.coefficient.clone());
            if flux.field == "solute" {
                table.push(HydrogenFlux::new(flux.surface, coefficient));
            } else {
                table.push(SurfaceFlux::new(flux.field.clone(), flux.surface, coefficient));
            }
        }

        for quantity in &config.volume_quantities {
            let field = quantity.field.clone();
            let volume = quantity.volume;
            match quantity.kind {
                VolumeKind::Total => table.push(TotalVolume::new(field, volume)),
                VolumeKind::Average => table.push(AverageVolume::new(field, volume)),
                VolumeKind::Maximum => table.push(MaximumVolume::new(field, volume)),
                VolumeKind::Minimum => table.push(MinimumVolume::new(field, volume)),
            }
        }

        Ok(Some(table))
    }
}
