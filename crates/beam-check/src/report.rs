use beam_core::errors::{BeamError, ErrorInfo};
use beam_diag::BeamMoments;
use serde::{Deserialize, Serialize};

use crate::tolerance::Tolerance;

/// Result of a single comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Stable identifier, `<stage>/<quantity>`.
    pub name: String,
    /// Whether the comparison passed.
    pub pass: bool,
    /// Measured deviation (or the measured count).
    pub metric: f64,
    /// Largest accepted deviation (or the expected count).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Explanation attached to failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Measurements of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage label.
    pub name: String,
    /// Glob that was loaded.
    pub pattern: String,
    /// Number of shards matched.
    pub files: usize,
    /// Number of particles loaded.
    pub particles: usize,
    /// Full moments of the stage.
    pub moments: BeamMoments,
}

/// Everything measured and checked for a regression case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Hash of the case definition.
    pub case_hash: String,
    /// Tolerance applied to the statistics.
    pub tolerance: Tolerance,
    /// Individual comparisons in execution order.
    pub checks: Vec<CheckOutcome>,
    /// Per-stage measurements.
    pub stages: Vec<StageReport>,
}

impl CheckReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.pass)
    }

    /// The failed checks.
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> + '_ {
        self.checks.iter().filter(|check| !check.pass)
    }

    /// Pretty-printed JSON form.
    pub fn to_json_pretty(&self) -> Result<String, BeamError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| BeamError::Serde(ErrorInfo::new("report-json", err.to_string())))
    }
}
