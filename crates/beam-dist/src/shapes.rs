//! Unit-covariance samplers for each supported beam shape.
//!
//! Every sampler returns coordinates with identity covariance; the
//! caller applies [`BeamParams::correlate`] to reach the requested moments.

use std::f64::consts::PI;

use beam_core::PhaseSpace;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::params::BeamParams;

/// A six-dimensional beam distribution.
pub trait BeamDistribution {
    /// Moments and correlations applied after unit sampling.
    fn params(&self) -> &BeamParams;

    /// Draws one particle with identity covariance.
    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace;

    /// Draws one particle with the configured moments.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        self.params().correlate(self.sample_unit(rng))
    }
}

fn normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample::<f64, _>(StandardNormal)
}

/// Point uniformly distributed on the unit sphere in `N` dimensions.
fn unit_sphere<const N: usize, R: Rng + ?Sized>(rng: &mut R) -> [f64; N] {
    loop {
        let mut v = [0.0; N];
        for value in v.iter_mut() {
            *value = normal(rng);
        }
        let norm = v.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            return v.map(|c| c / norm);
        }
    }
}

/// Uniform draw on `[-sqrt(3), sqrt(3)]`, which has unit variance.
fn unit_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    3f64.sqrt() * (2.0 * rng.gen::<f64>() - 1.0)
}

macro_rules! shape {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            /// Target moments.
            pub params: BeamParams,
        }

        impl $name {
            /// Creates the distribution after validating `params`.
            pub fn new(params: BeamParams) -> Result<Self, beam_core::BeamError> {
                params.validate()?;
                Ok(Self { params })
            }
        }
    };
}

shape!(
    /// Independent normal deviates in all six coordinates.
    Gaussian
);
shape!(
    /// Uniform filling of the 6-ball.
    Waterbag
);
shape!(
    /// 4D Kurth distribution transversely, uniform `t` and Gaussian `pt`.
    Kurth4D
);
shape!(
    /// Stationary 6D Kurth distribution.
    Kurth6D
);
shape!(
    /// Kapchinskij-Vladimirskij shell transversely, uniform `t` and Gaussian `pt`.
    KVdist
);
shape!(
    /// Uniform 3-ball in position with Gaussian momenta.
    Semigaussian
);

impl BeamDistribution for Gaussian {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        PhaseSpace::new(
            normal(rng),
            normal(rng),
            normal(rng),
            normal(rng),
            normal(rng),
            normal(rng),
        )
    }
}

impl BeamDistribution for Waterbag {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        let [x, y, t, px, py, pt] = unit_sphere::<6, _>(rng);
        let radius = 8f64.sqrt() * rng.gen::<f64>().powf(1.0 / 6.0);
        PhaseSpace::new(x, y, t, px, py, pt).scaled(radius)
    }
}

impl BeamDistribution for Kurth6D {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        let v: f64 = rng.gen();
        let costheta = 2.0 * (rng.gen::<f64>() - 0.5);
        let sintheta = (1.0 - costheta * costheta).sqrt();
        let phi = 2.0 * PI * rng.gen::<f64>();

        let r = v.powf(1.0 / 3.0);
        let x = r * sintheta * phi.cos();
        let y = r * sintheta * phi.sin();
        let t = r * costheta;

        let l = r * rng.gen::<f64>().sqrt();
        let alpha = PI * rng.gen::<f64>();
        let pmax = radial_limit(l, r);
        let pr = pmax * alpha.cos();

        let beta = 2.0 * PI * rng.gen::<f64>();
        let p_phi = ratio(l, r) * beta.cos();
        let p_theta = ratio(l, r) * beta.sin();

        let px = pr * sintheta * phi.cos() + p_theta * costheta * phi.cos() - p_phi * phi.sin();
        let py = pr * sintheta * phi.sin() + p_theta * costheta * phi.sin() + p_phi * phi.cos();
        let pt = pr * costheta - p_theta * sintheta;

        PhaseSpace::new(x, y, t, px, py, pt).scaled(5f64.sqrt())
    }
}

impl BeamDistribution for Kurth4D {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        let r = rng.gen::<f64>().sqrt();
        let phi = 2.0 * PI * rng.gen::<f64>();
        let x = r * phi.cos();
        let y = r * phi.sin();

        let l = r * (2.0 * rng.gen::<f64>() - 1.0);
        let alpha = PI * rng.gen::<f64>();
        let pr = radial_limit(l, r) * alpha.cos();
        let p_phi = ratio(l, r);

        let px = pr * phi.cos() - p_phi * phi.sin();
        let py = pr * phi.sin() + p_phi * phi.cos();

        PhaseSpace::new(2.0 * x, 2.0 * y, unit_uniform(rng), 2.0 * px, 2.0 * py, normal(rng))
    }
}

impl BeamDistribution for KVdist {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        let [x, y, px, py] = unit_sphere::<4, _>(rng).map(|c| 2.0 * c);
        PhaseSpace::new(x, y, unit_uniform(rng), px, py, normal(rng))
    }
}

impl BeamDistribution for Semigaussian {
    fn params(&self) -> &BeamParams {
        &self.params
    }

    fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpace {
        let [x, y, t] = unit_sphere::<3, _>(rng);
        let radius = 5f64.sqrt() * rng.gen::<f64>().powf(1.0 / 3.0);
        PhaseSpace::new(
            radius * x,
            radius * y,
            radius * t,
            normal(rng),
            normal(rng),
            normal(rng),
        )
    }
}

/// `L / r`, zero at the origin.
fn ratio(l: f64, r: f64) -> f64 {
    if r > 0.0 {
        l / r
    } else {
        0.0
    }
}

/// Largest radial momentum allowed for angular momentum `l` at radius `r`.
fn radial_limit(l: f64, r: f64) -> f64 {
    (1.0 - ratio(l, r).powi(2) - r * r + l * l).max(0.0).sqrt()
}
