//! Invariants of motion inside a Danilov-Nagaitsev nonlinear insert.

use std::path::Path;

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{ParticleTile, PhaseSpace};
use csv::WriterBuilder;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::shard::{ensure_parent, wrap_csv};

/// The two phase-space functions in involution, `H` and `I`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvariantValues {
    /// Hamiltonian.
    pub h: f64,
    /// Second invariant.
    pub i: f64,
}

/// Lens and Twiss parameters defining the normalised coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonlinearLensInvariants {
    /// Twiss alpha.
    pub alpha: f64,
    /// Twiss beta in m.
    pub beta: f64,
    /// Dimensionless strength of the insert.
    pub tn: f64,
    /// Scale parameter of the insert in m^(1/2).
    pub cn: f64,
}

impl NonlinearLensInvariants {
    /// Creates the functor; `beta` and `cn` must be positive.
    pub fn new(alpha: f64, beta: f64, tn: f64, cn: f64) -> Result<Self, BeamError> {
        let invariants = Self { alpha, beta, tn, cn };
        invariants.validate()?;
        Ok(invariants)
    }

    /// Checks the parameters after deserialisation.
    pub fn validate(&self) -> Result<(), BeamError> {
        let finite = [self.alpha, self.beta, self.tn, self.cn]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.beta <= 0.0 || self.cn <= 0.0 {
            return Err(BeamError::Config(
                ErrorInfo::new("invariant-params", "beta and cn must be positive and finite")
                    .with_context("beta", self.beta.to_string())
                    .with_context("cn", self.cn.to_string()),
            ));
        }
        Ok(())
    }

    /// Evaluates `H` and `I` for one particle.
    pub fn evaluate(&self, x: f64, y: f64, px: f64, py: f64) -> InvariantValues {
        let sqrt_beta = self.beta.sqrt();
        let xn = x / (self.cn * sqrt_beta);
        let yn = y / (self.cn * sqrt_beta);
        let pxn = px * sqrt_beta / self.cn + self.alpha * x;
        let pyn = py * sqrt_beta / self.cn + self.alpha * y;

        let zeta = Complex64::new(xn, yn);
        let croot = (Complex64::new(1.0, 0.0) - zeta * zeta).sqrt();
        let carcsin = -Complex64::i() * (Complex64::i() * zeta + croot).ln();

        let h_potential = zeta / croot * carcsin;
        let i_potential = (zeta + zeta.conj()) / croot * carcsin;

        let jz = xn * pyn - yn * pxn;
        let h = (xn * xn + yn * yn + pxn * pxn + pyn * pyn) / 2.0 + self.tn * h_potential.re;
        let i = jz * jz + pxn * pxn + xn * xn + self.tn * i_potential.re;
        InvariantValues { h, i }
    }

    /// Evaluates the invariants of a particle's transverse coordinates.
    pub fn of(&self, p: &PhaseSpace) -> InvariantValues {
        self.evaluate(p.x, p.y, p.px, p.py)
    }

    /// Writes `id H I` rows for every particle of a tile.
    pub fn write(&self, path: impl AsRef<Path>, tile: &ParticleTile) -> Result<(), BeamError> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let mut wtr = WriterBuilder::new()
            .delimiter(b' ')
            .from_path(path)
            .map_err(|err| wrap_csv("invariants-create", path, err))?;
        wtr.write_record(["id", "H", "I"])
            .map_err(|err| wrap_csv("invariants-write", path, err))?;
        for (id, p) in tile.iter() {
            let values = self.of(p);
            wtr.write_record([
                id.to_string(),
                format!("{:e}", values.h),
                format!("{:e}", values.i),
            ])
            .map_err(|err| wrap_csv("invariants-write", path, err))?;
        }
        wtr.flush()
            .map_err(|err| BeamError::io("invariants-flush", path, err))
    }
}
