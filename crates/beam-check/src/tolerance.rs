use beam_core::errors::{BeamError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Absolute and relative tolerance with `allclose` semantics:
/// `|actual - expected| <= atol + rtol * |expected|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Absolute tolerance.
    #[serde(default = "Tolerance::default_atol")]
    pub atol: f64,
    /// Relative tolerance, applied to the expected value.
    #[serde(default = "Tolerance::default_rtol")]
    pub rtol: f64,
}

impl Tolerance {
    const fn default_atol() -> f64 {
        1e-8
    }

    const fn default_rtol() -> f64 {
        1e-5
    }

    /// Creates a tolerance.
    pub const fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    /// Tolerance for statistics of `n` randomly sampled particles:
    /// `atol = 1`, `rtol = n^-1/2`.
    pub fn for_particles(n: usize) -> Self {
        Self {
            atol: 1.0,
            rtol: (n as f64).powf(-0.5),
        }
    }

    /// Largest accepted deviation from `expected`.
    pub fn threshold(&self, expected: f64) -> f64 {
        self.atol + self.rtol * expected.abs()
    }

    /// Whether `actual` is close to `expected`. NaN is never close.
    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        if actual.is_nan() || expected.is_nan() {
            return false;
        }
        if actual.is_infinite() || expected.is_infinite() {
            return actual == expected;
        }
        (actual - expected).abs() <= self.threshold(expected)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::default_atol(), Self::default_rtol())
    }
}

/// Element-wise [`Tolerance::is_close`] over two slices of equal length.
pub fn allclose(actual: &[f64], expected: &[f64], tol: &Tolerance) -> Result<bool, BeamError> {
    if actual.len() != expected.len() {
        return Err(BeamError::Check(
            ErrorInfo::new("length-mismatch", "compared sequences differ in length")
                .with_context("actual", actual.len().to_string())
                .with_context("expected", expected.len().to_string()),
        ));
    }
    Ok(actual
        .iter()
        .zip(expected)
        .all(|(a, e)| tol.is_close(*a, *e)))
}
