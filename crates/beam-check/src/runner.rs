use std::path::Path;

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::stable_hash_string;
use beam_diag::{get_moments, read_matching};
use log::{info, warn};

use crate::case::{RegressionCase, StageSpec, STATISTIC_NAMES};
use crate::report::{CheckOutcome, CheckReport, StageReport};
use crate::tolerance::Tolerance;

/// Loads every stage below `diags_dir` and compares it against the case.
///
/// Unreadable or missing shards are errors; statistical mismatches are
/// reported as failed [`CheckOutcome`]s.
pub fn run_case(case: &RegressionCase, diags_dir: impl AsRef<Path>) -> Result<CheckReport, BeamError> {
    case.validate()?;
    let diags_dir = diags_dir.as_ref();
    let tolerance = case.tolerance();
    let mut checks = Vec::new();
    let mut stages = Vec::with_capacity(case.stages.len());

    for stage in &case.stages {
        let report = load_stage(stage, diags_dir)?;
        checks.push(count_check(stage, report.particles, case.num_particles));
        if let Some(expected) = &stage.expected {
            checks.extend(statistic_checks(stage, &report.moments.statistics(), expected, &tolerance));
        }
        stages.push(report);
    }

    let report = CheckReport {
        case_hash: stable_hash_string(case)?,
        tolerance,
        checks,
        stages,
    };
    if report.passed() {
        info!("all {} check(s) passed", report.checks.len());
    } else {
        for failure in report.failures() {
            warn!("check {} failed: metric {}", failure.name, failure.metric);
        }
    }
    Ok(report)
}

fn load_stage(stage: &StageSpec, diags_dir: &Path) -> Result<StageReport, BeamError> {
    let pattern = diags_dir.join(&stage.pattern);
    let pattern = pattern.to_str().ok_or_else(|| {
        BeamError::Config(
            ErrorInfo::new("non-utf8-path", "shard pattern is not valid UTF-8")
                .with_context("stage", stage.name.clone()),
        )
    })?;
    let (table, paths) = read_matching(pattern)?;
    let moments = get_moments(&table).map_err(|err| match err {
        BeamError::Check(info) => BeamError::Check(info.with_context("stage", stage.name.clone())),
        other => other,
    })?;
    Ok(StageReport {
        name: stage.name.clone(),
        pattern: stage.pattern.clone(),
        files: paths.len(),
        particles: table.len(),
        moments,
    })
}

fn count_check(stage: &StageSpec, found: usize, expected: usize) -> CheckOutcome {
    let pass = found == expected;
    CheckOutcome {
        name: format!("{}/num_particles", stage.name),
        pass,
        metric: found as f64,
        threshold: Some(expected as f64),
        note: (!pass).then(|| format!("expected {expected} particles, found {found}")),
    }
}

fn statistic_checks(
    stage: &StageSpec,
    actual: &[f64; 6],
    expected: &[f64; 6],
    tolerance: &Tolerance,
) -> Vec<CheckOutcome> {
    STATISTIC_NAMES
        .iter()
        .zip(actual.iter().zip(expected))
        .map(|(name, (&a, &e))| {
            let pass = tolerance.is_close(a, e);
            CheckOutcome {
                name: format!("{}/{name}", stage.name),
                pass,
                metric: (a - e).abs(),
                threshold: Some(tolerance.threshold(e)),
                note: (!pass).then(|| format!("measured {a:e}, reference {e:e}")),
            }
        })
        .collect()
}
