use std::fs;
use std::path::Path;

use beam_core::errors::{BeamError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::tolerance::Tolerance;

/// Names of the six compared statistics, in comparison order.
pub const STATISTIC_NAMES: [&str; 6] = [
    "sigx",
    "sigy",
    "sigt",
    "emittance_x",
    "emittance_y",
    "emittance_t",
];

/// One beam snapshot to load and compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Label used in reports, e.g. `Initial Beam`.
    pub name: String,
    /// Glob of the shards, relative to the diagnostics directory.
    pub pattern: String,
    /// Reference statistics in [`STATISTIC_NAMES`] order; only the particle
    /// count is checked when absent.
    #[serde(default)]
    pub expected: Option<[f64; 6]>,
}

/// A regression case: expected particle count and reference statistics.
///
/// ```yaml
/// num_particles: 10000
/// stages:
///   - name: Initial Beam
///     pattern: beam_000000.*
///     expected: [1.0e-3, 1.0e-3, 3.2e-4, 1.0e-6, 1.0e-6, 1.0e-6]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionCase {
    /// Exact number of particles every stage must contain.
    pub num_particles: usize,
    /// Overrides the absolute tolerance of [`Tolerance::for_particles`].
    #[serde(default)]
    pub atol: Option<f64>,
    /// Overrides the relative tolerance of [`Tolerance::for_particles`].
    #[serde(default)]
    pub rtol: Option<f64>,
    /// Snapshots to check, in order.
    pub stages: Vec<StageSpec>,
}

impl RegressionCase {
    /// Parses and validates a case from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, BeamError> {
        let case: RegressionCase = serde_yaml::from_str(text)
            .map_err(|err| BeamError::Serde(ErrorInfo::new("case-yaml", err.to_string())))?;
        case.validate()?;
        Ok(case)
    }

    /// Reads a case file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| BeamError::io("case-read", path, err))?;
        Self::from_yaml_str(&text)
    }

    /// Rejects cases that could never pass or never check anything.
    pub fn validate(&self) -> Result<(), BeamError> {
        if self.stages.is_empty() {
            return Err(BeamError::Check(ErrorInfo::new(
                "empty-case",
                "a regression case needs at least one stage",
            )));
        }
        let tol = self.tolerance();
        if !(tol.atol >= 0.0 && tol.rtol >= 0.0) {
            return Err(BeamError::Check(
                ErrorInfo::new("negative-tolerance", "tolerances must be non-negative")
                    .with_context("atol", tol.atol.to_string())
                    .with_context("rtol", tol.rtol.to_string()),
            ));
        }
        Ok(())
    }

    /// Effective tolerance: `atol = 1`, `rtol = n^-1/2` unless overridden.
    pub fn tolerance(&self) -> Tolerance {
        let base = Tolerance::for_particles(self.num_particles);
        Tolerance::new(
            self.atol.unwrap_or(base.atol),
            self.rtol.unwrap_or(base.rtol),
        )
    }
}
