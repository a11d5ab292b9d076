//! Distribution selected by name in a run configuration.

use beam_core::{BeamError, PhaseSpace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::BeamParams;
use crate::shapes::{
    BeamDistribution, Gaussian, KVdist, Kurth4D, Kurth6D, Semigaussian, Waterbag,
};

/// Every distribution that can be named in a run configuration.
///
/// ```yaml
/// type: waterbag
/// sigmaX: 1.0e-3
/// sigmaY: 1.0e-3
/// sigmaT: 3.0e-4
/// sigmaPx: 1.0e-3
/// sigmaPy: 1.0e-3
/// sigmaPt: 3.3e-3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnownDistribution {
    /// See [`Gaussian`].
    Gaussian(BeamParams),
    /// See [`Waterbag`].
    Waterbag(BeamParams),
    /// See [`Kurth4D`].
    Kurth4d(BeamParams),
    /// See [`Kurth6D`].
    Kurth6d(BeamParams),
    /// See [`KVdist`].
    Kvdist(BeamParams),
    /// See [`Semigaussian`].
    Semigaussian(BeamParams),
    /// Produces no particles.
    Empty,
}

impl KnownDistribution {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            KnownDistribution::Gaussian(_) => "gaussian",
            KnownDistribution::Waterbag(_) => "waterbag",
            KnownDistribution::Kurth4d(_) => "kurth4d",
            KnownDistribution::Kurth6d(_) => "kurth6d",
            KnownDistribution::Kvdist(_) => "kvdist",
            KnownDistribution::Semigaussian(_) => "semigaussian",
            KnownDistribution::Empty => "empty",
        }
    }

    /// Moment parameters, absent for [`KnownDistribution::Empty`].
    pub fn params(&self) -> Option<&BeamParams> {
        match self {
            KnownDistribution::Gaussian(p)
            | KnownDistribution::Waterbag(p)
            | KnownDistribution::Kurth4d(p)
            | KnownDistribution::Kurth6d(p)
            | KnownDistribution::Kvdist(p)
            | KnownDistribution::Semigaussian(p) => Some(p),
            KnownDistribution::Empty => None,
        }
    }

    /// Validates the moment parameters.
    pub fn validate(&self) -> Result<(), BeamError> {
        match self.params() {
            Some(params) => params.validate(),
            None => Ok(()),
        }
    }

    /// Draws a single particle. Returns `None` for the empty distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PhaseSpace> {
        let particle = match *self {
            KnownDistribution::Gaussian(params) => Gaussian { params }.sample(rng),
            KnownDistribution::Waterbag(params) => Waterbag { params }.sample(rng),
            KnownDistribution::Kurth4d(params) => Kurth4D { params }.sample(rng),
            KnownDistribution::Kurth6d(params) => Kurth6D { params }.sample(rng),
            KnownDistribution::Kvdist(params) => KVdist { params }.sample(rng),
            KnownDistribution::Semigaussian(params) => Semigaussian { params }.sample(rng),
            KnownDistribution::Empty => return None,
        };
        Some(particle)
    }

    /// Draws `n` particles after validating the parameters.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<PhaseSpace>, BeamError> {
        self.validate()?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.sample(rng) {
                Some(particle) => out.push(particle),
                None => break,
            }
        }
        Ok(out)
    }
}
