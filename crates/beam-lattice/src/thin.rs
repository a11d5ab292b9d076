//! Zero-length kicks. None of them moves the reference particle.

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{PhaseSpace, RefPart};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::element::{check_finite, check_nonzero, BeamlineElement};

/// No-op element, also used for MAD-X markers and monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Marker {}

impl BeamlineElement for Marker {
    fn name(&self) -> &'static str {
        "None"
    }

    fn ds(&self) -> f64 {
        0.0
    }

    fn push_particle(&self, _p: &mut PhaseSpace, _refpart: &RefPart) {}
}

/// Thin dipole fringe field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipEdge {
    /// Pole face angle in rad.
    pub psi: f64,
    /// Bending radius in m.
    pub rc: f64,
    /// Gap parameter in m.
    #[serde(default)]
    pub g: f64,
    /// Fringe field integral.
    #[serde(default)]
    pub k2: f64,
}

impl DipEdge {
    /// Creates an edge kick.
    pub fn new(psi: f64, rc: f64, g: f64, k2: f64) -> Result<Self, BeamError> {
        check_finite("DipEdge", &[("psi", psi), ("rc", rc), ("g", g), ("k2", k2)])?;
        check_nonzero("DipEdge", "rc", rc)?;
        Ok(Self { psi, rc, g, k2 })
    }
}

impl BeamlineElement for DipEdge {
    fn name(&self) -> &'static str {
        "DipEdge"
    }

    fn ds(&self) -> f64 {
        0.0
    }

    fn push_particle(&self, p: &mut PhaseSpace, _refpart: &RefPart) {
        let (sin, cos) = self.psi.sin_cos();
        let r21 = self.psi.tan() / self.rc;
        let vf = self.g * self.k2 * (1.0 + sin * sin) / (cos.powi(3) * self.rc.powi(2));
        let r43 = -r21 + vf;
        p.px += r21 * p.x;
        p.py += r43 * p.y;
    }
}

/// Short RF cavity at zero crossing, used for bunching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortRF {
    /// Normalised RF voltage drop.
    #[serde(alias = "V")]
    pub v: f64,
    /// RF wavenumber in 1/m.
    pub k: f64,
}

impl ShortRF {
    /// Creates a bunching kick.
    pub fn new(v: f64, k: f64) -> Result<Self, BeamError> {
        check_finite("ShortRF", &[("V", v), ("k", k)])?;
        Ok(Self { v, k })
    }
}

impl BeamlineElement for ShortRF {
    fn name(&self) -> &'static str {
        "ShortRF"
    }

    fn ds(&self) -> f64 {
        0.0
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        let betgam2 = refpart.beta_gamma_sq();
        let kv = self.k * self.v;
        p.px += kv / (2.0 * betgam2) * p.x;
        p.py += kv / (2.0 * betgam2) * p.y;
        p.pt -= kv * p.t;
    }
}

/// Thin multipole of order `m` (1 = dipole, 2 = quadrupole, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipole {
    /// Multipole order.
    pub m: u32,
    /// Integrated normal strength.
    #[serde(default)]
    pub kn: f64,
    /// Integrated skew strength.
    #[serde(default)]
    pub ks: f64,
}

impl Multipole {
    /// Creates a thin multipole.
    pub fn new(m: u32, kn: f64, ks: f64) -> Result<Self, BeamError> {
        check_finite("Multipole", &[("kn", kn), ("ks", ks)])?;
        if m == 0 {
            return Err(BeamError::Lattice(
                ErrorInfo::new("multipole-order", "multipole order starts at 1")
                    .with_context("element", "Multipole"),
            ));
        }
        Ok(Self { m, kn, ks })
    }

    fn factorial(&self) -> f64 {
        (1..self.m).map(f64::from).product()
    }
}

impl BeamlineElement for Multipole {
    fn name(&self) -> &'static str {
        "Multipole"
    }

    fn ds(&self) -> f64 {
        0.0
    }

    fn push_particle(&self, p: &mut PhaseSpace, _refpart: &RefPart) {
        let alpha = Complex64::new(p.x, p.y).powu(self.m.saturating_sub(1));
        let norm = self.factorial();
        p.px += (-self.kn * alpha.re + self.ks * alpha.im) / norm;
        p.py += (self.kn * alpha.im + self.ks * alpha.re) / norm;
    }
}

/// One thin segment of a Danilov-Nagaitsev nonlinear insert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonlinearLens {
    /// Integrated strength in m.
    pub knll: f64,
    /// Distance of the singularities from the origin in m.
    pub cnll: f64,
}

impl NonlinearLens {
    /// Creates a lens segment.
    pub fn new(knll: f64, cnll: f64) -> Result<Self, BeamError> {
        check_finite("NonlinearLens", &[("knll", knll), ("cnll", cnll)])?;
        check_nonzero("NonlinearLens", "cnll", cnll)?;
        Ok(Self { knll, cnll })
    }
}

impl BeamlineElement for NonlinearLens {
    fn name(&self) -> &'static str {
        "NonlinearLens"
    }

    fn ds(&self) -> f64 {
        0.0
    }

    fn push_particle(&self, p: &mut PhaseSpace, _refpart: &RefPart) {
        let zeta = Complex64::new(p.x, p.y);
        let croot = (Complex64::new(1.0, 0.0) - zeta * zeta).sqrt();
        let carcsin = -Complex64::i() * (Complex64::i() * zeta + croot).ln();
        let df = zeta / croot.powi(2) + carcsin / croot.powi(3);
        let kick = -self.knll / self.cnll;
        p.px += kick * df.re;
        p.py -= kick * df.im;
    }
}
