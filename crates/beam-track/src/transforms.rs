//! Conversions between the static fixed-`s` and fixed-`t` coordinate systems.
//!
//! At fixed `s` a particle carries `(x, y, t, px, py, pt)`; at fixed `t` the
//! longitudinal pair becomes `(z, pz)`. Momenta are normalised to the
//! reference momentum in both systems.

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{ParticleBunch, PhaseSpace};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Target coordinate system of a bunch transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From fixed `t` back to fixed `s`.
    ToFixedS,
    /// From fixed `s` to fixed `t`.
    ToFixedT,
}

fn radicand_error(code: &str, name: &str, value: f64) -> BeamError {
    BeamError::Physics(
        ErrorInfo::new(code, "coordinate transform argument must be positive")
            .with_context(name, value.to_string()),
    )
}

/// Transforms one particle from fixed `s` to fixed `t`.
///
/// `ptd` is the design value of `pt` (the negative reference gamma). The
/// particle is left untouched when an error is returned.
pub fn to_fixed_t(p: &mut PhaseSpace, ptd: f64) -> Result<(), BeamError> {
    let argd = ptd * ptd - 1.0;
    if !(argd > 0.0) {
        return Err(radicand_error("fixed-t-design", "ptd", ptd));
    }
    let pzd = argd.sqrt();

    let px = p.px * pzd;
    let py = p.py * pzd;
    let pt = p.pt * pzd;
    let energy = ptd + pt;
    let arg = -1.0 + energy * energy - px * px - py * py;
    if !(arg > 0.0) {
        return Err(radicand_error("fixed-t-momentum", "arg", arg));
    }
    let pz = arg.sqrt();

    let t = p.t;
    p.x += px * t / energy;
    p.y += py * t / energy;
    p.t = pz * t / energy;
    p.px = px / pzd;
    p.py = py / pzd;
    p.pt = (pz - pzd) / pzd;
    Ok(())
}

/// Transforms one particle from fixed `t` back to fixed `s`.
///
/// `pzd` is the design longitudinal momentum. The particle is left untouched
/// when an error is returned.
pub fn to_fixed_s(p: &mut PhaseSpace, pzd: f64) -> Result<(), BeamError> {
    if !(pzd > 0.0) || !pzd.is_finite() {
        return Err(radicand_error("fixed-s-design", "pzd", pzd));
    }
    let ptdf = -(1.0 + pzd * pzd).sqrt();

    let px = p.px * pzd;
    let py = p.py * pzd;
    let pz = p.pt * pzd;
    let momentum = pzd + pz;
    if momentum == 0.0 {
        return Err(radicand_error("fixed-s-momentum", "pz", momentum));
    }
    let ptf = -(1.0 + momentum * momentum + px * px + py * py).sqrt();

    let z = p.t;
    p.x -= px * z / momentum;
    p.y -= py * z / momentum;
    p.t = ptf * z / momentum;
    p.px = px / pzd;
    p.py = py / pzd;
    p.pt = (ptf - ptdf) / pzd;
    Ok(())
}

/// Applies a transform to every particle of the bunch using its reference.
pub fn transform_bunch(bunch: &mut ParticleBunch, direction: Direction) -> Result<(), BeamError> {
    let refpart = *bunch.ref_particle();
    let (ptd, pzd) = (refpart.pt, refpart.pz);
    bunch.tiles_mut().par_iter_mut().try_for_each(|tile| {
        tile.coords.iter_mut().try_for_each(|p| match direction {
            Direction::ToFixedT => to_fixed_t(p, ptd),
            Direction::ToFixedS => to_fixed_s(p, pzd),
        })
    })?;
    debug!("transformed {} particles {direction:?}", bunch.len());
    Ok(())
}
