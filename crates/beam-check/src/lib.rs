#![deny(missing_docs)]
#![doc = "Regression checks of beam statistics: tolerance policy, reference cases and reports."]

/// Regression case definitions.
pub mod case;
/// Check outcomes and aggregated reports.
pub mod report;
/// Loading stages and evaluating a case.
pub mod runner;
/// `allclose`-style tolerance policy.
pub mod tolerance;

pub use case::{RegressionCase, StageSpec, STATISTIC_NAMES};
pub use report::{CheckOutcome, CheckReport, StageReport};
pub use runner::run_case;
pub use tolerance::{allclose, Tolerance};
