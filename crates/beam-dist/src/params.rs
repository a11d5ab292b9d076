//! Beam sizes, correlations and the transform from unit coordinates.

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::PhaseSpace;
use serde::{Deserialize, Serialize};

/// RMS sizes and position-momentum correlations shared by every distribution.
///
/// For zero correlation the sigmas are the RMS values of the sampled
/// coordinates; with a non-zero `mu` the position spread is scaled by
/// `1 / sqrt(1 - mu^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamParams {
    /// RMS size in x (m).
    #[serde(rename = "sigmaX", alias = "sigma_x")]
    pub sigma_x: f64,
    /// RMS size in y (m).
    #[serde(rename = "sigmaY", alias = "sigma_y")]
    pub sigma_y: f64,
    /// RMS size in t (m).
    #[serde(rename = "sigmaT", alias = "sigma_t")]
    pub sigma_t: f64,
    /// RMS momentum in x.
    #[serde(rename = "sigmaPx", alias = "sigma_px")]
    pub sigma_px: f64,
    /// RMS momentum in y.
    #[serde(rename = "sigmaPy", alias = "sigma_py")]
    pub sigma_py: f64,
    /// RMS energy deviation.
    #[serde(rename = "sigmaPt", alias = "sigma_pt")]
    pub sigma_pt: f64,
    /// Correlation between x and px.
    #[serde(default)]
    pub muxpx: f64,
    /// Correlation between y and py.
    #[serde(default)]
    pub muypy: f64,
    /// Correlation between t and pt.
    #[serde(default)]
    pub mutpt: f64,
}

impl BeamParams {
    /// Uncorrelated parameters.
    pub const fn uncorrelated(
        sigma_x: f64,
        sigma_y: f64,
        sigma_t: f64,
        sigma_px: f64,
        sigma_py: f64,
        sigma_pt: f64,
    ) -> Self {
        Self {
            sigma_x,
            sigma_y,
            sigma_t,
            sigma_px,
            sigma_py,
            sigma_pt,
            muxpx: 0.0,
            muypy: 0.0,
            mutpt: 0.0,
        }
    }

    /// Sets the three position-momentum correlations.
    pub const fn with_correlations(mut self, muxpx: f64, muypy: f64, mutpt: f64) -> Self {
        self.muxpx = muxpx;
        self.muypy = muypy;
        self.mutpt = mutpt;
        self
    }

    /// Checks that sigmas are finite and non-negative and `|mu| < 1`.
    pub fn validate(&self) -> Result<(), BeamError> {
        let sigmas = [
            ("sigmaX", self.sigma_x),
            ("sigmaY", self.sigma_y),
            ("sigmaT", self.sigma_t),
            ("sigmaPx", self.sigma_px),
            ("sigmaPy", self.sigma_py),
            ("sigmaPt", self.sigma_pt),
        ];
        for (name, value) in sigmas {
            if !value.is_finite() || value < 0.0 {
                return Err(BeamError::Distribution(
                    ErrorInfo::new("invalid-sigma", "RMS parameters must be finite and >= 0")
                        .with_context("parameter", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        for (name, value) in [
            ("muxpx", self.muxpx),
            ("muypy", self.muypy),
            ("mutpt", self.mutpt),
        ] {
            if !value.is_finite() || value.abs() >= 1.0 {
                return Err(BeamError::Distribution(
                    ErrorInfo::new("invalid-correlation", "correlations must satisfy |mu| < 1")
                        .with_context("parameter", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Maps unit-covariance coordinates onto the requested moments.
    pub fn correlate(&self, unit: PhaseSpace) -> PhaseSpace {
        let (x, px) = correlate_plane(unit.x, unit.px, self.sigma_x, self.sigma_px, self.muxpx);
        let (y, py) = correlate_plane(unit.y, unit.py, self.sigma_y, self.sigma_py, self.muypy);
        let (t, pt) = correlate_plane(unit.t, unit.pt, self.sigma_t, self.sigma_pt, self.mutpt);
        PhaseSpace::new(x, y, t, px, py, pt)
    }
}

fn correlate_plane(q: f64, p: f64, sigma_q: f64, sigma_p: f64, mu: f64) -> (f64, f64) {
    let root = (1.0 - mu * mu).sqrt();
    let q_out = sigma_q * q / root;
    let p_out = sigma_p * (-mu * q / root + p);
    (q_out, p_out)
}
