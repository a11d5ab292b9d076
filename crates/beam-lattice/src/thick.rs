//! Elements with a non-zero length. Each one is applied slice by slice.

use beam_core::{BeamError, PhaseSpace, RefPart};
use serde::{Deserialize, Serialize};

use crate::element::{check_finite, check_nonzero, check_nslice, BeamlineElement};

fn default_nslice() -> usize {
    1
}

/// Advances the reference particle along a straight path of length `h`.
pub(crate) fn push_ref_straight(refpart: &mut RefPart, h: f64) {
    let step = h / (refpart.pt.powi(2) - 1.0).sqrt();
    refpart.x += step * refpart.px;
    refpart.y += step * refpart.py;
    refpart.z += step * refpart.pz;
    refpart.t -= step * refpart.pt;
    refpart.s += h;
}

/// Linear map of a harmonic oscillator with strength `k` over length `h`.
///
/// Returns `(cos, sin / k, -k * sin)`; `k == 0` yields the drift limit.
fn rotation(k: f64, h: f64) -> (f64, f64, f64) {
    if k == 0.0 {
        (1.0, h, 0.0)
    } else {
        let (sin, cos) = (k * h).sin_cos();
        (cos, sin / k, -k * sin)
    }
}

/// Field-free drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    /// Segment length in m.
    pub ds: f64,
    /// Number of slices.
    #[serde(default = "default_nslice")]
    pub nslice: usize,
}

impl Drift {
    /// Creates a drift of length `ds`.
    pub fn new(ds: f64, nslice: usize) -> Result<Self, BeamError> {
        check_finite("Drift", &[("ds", ds)])?;
        check_nslice("Drift", nslice)?;
        Ok(Self { ds, nslice })
    }
}

impl BeamlineElement for Drift {
    fn name(&self) -> &'static str {
        "Drift"
    }

    fn ds(&self) -> f64 {
        self.ds
    }

    fn nslice(&self) -> usize {
        self.nslice
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        let h = self.slice_ds();
        let betgam2 = refpart.beta_gamma_sq();
        p.x += h * p.px;
        p.y += h * p.py;
        p.t += h / betgam2 * p.pt;
    }

    fn push_ref(&self, refpart: &mut RefPart) {
        push_ref_straight(refpart, self.slice_ds());
    }
}

/// Quadrupole; `k > 0` focuses horizontally, `k < 0` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// Segment length in m.
    pub ds: f64,
    /// Quadrupole strength in 1/m^2.
    pub k: f64,
    /// Number of slices.
    #[serde(default = "default_nslice")]
    pub nslice: usize,
}

impl Quad {
    /// Creates a quadrupole.
    pub fn new(ds: f64, k: f64, nslice: usize) -> Result<Self, BeamError> {
        check_finite("Quad", &[("ds", ds), ("k", k)])?;
        check_nslice("Quad", nslice)?;
        Ok(Self { ds, k, nslice })
    }
}

impl BeamlineElement for Quad {
    fn name(&self) -> &'static str {
        "Quad"
    }

    fn ds(&self) -> f64 {
        self.ds
    }

    fn nslice(&self) -> usize {
        self.nslice
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        let h = self.slice_ds();
        let betgam2 = refpart.beta_gamma_sq();
        let omega = self.k.abs().sqrt();

        let (c, s_over, minus_s) = rotation(omega, h);
        let (ch, sh_over, sh_times) = if omega == 0.0 {
            (1.0, h, 0.0)
        } else {
            let arg = omega * h;
            (arg.cosh(), arg.sinh() / omega, omega * arg.sinh())
        };

        let (x, px, y, py) = (p.x, p.px, p.y, p.py);
        if self.k > 0.0 {
            p.x = c * x + s_over * px;
            p.px = minus_s * x + c * px;
            p.y = ch * y + sh_over * py;
            p.py = sh_times * y + ch * py;
        } else {
            p.x = ch * x + sh_over * px;
            p.px = sh_times * x + ch * px;
            p.y = c * y + s_over * py;
            p.py = minus_s * y + c * py;
        }
        p.t += h / betgam2 * p.pt;
    }

    fn push_ref(&self, refpart: &mut RefPart) {
        push_ref_straight(refpart, self.slice_ds());
    }
}

/// Ideal sector bend without edge focusing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sbend {
    /// Arc length in m.
    pub ds: f64,
    /// Bending radius in m; the sign selects the bend direction.
    pub rc: f64,
    /// Number of slices.
    #[serde(default = "default_nslice")]
    pub nslice: usize,
}

impl Sbend {
    /// Creates a sector bend.
    pub fn new(ds: f64, rc: f64, nslice: usize) -> Result<Self, BeamError> {
        check_finite("Sbend", &[("ds", ds), ("rc", rc)])?;
        check_nonzero("Sbend", "rc", rc)?;
        check_nslice("Sbend", nslice)?;
        Ok(Self { ds, rc, nslice })
    }
}

impl BeamlineElement for Sbend {
    fn name(&self) -> &'static str {
        "Sbend"
    }

    fn ds(&self) -> f64 {
        self.ds
    }

    fn nslice(&self) -> usize {
        self.nslice
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        let h = self.slice_ds();
        let rc = self.rc;
        let theta = h / rc;
        let (sin, cos) = theta.sin_cos();
        let betgam2 = refpart.beta_gamma_sq();
        let bet = (betgam2 / (1.0 + betgam2)).sqrt();

        let (x, px, y, py, t, pt) = (p.x, p.px, p.y, p.py, p.t, p.pt);
        p.x = cos * x + rc * sin * px - (rc / bet) * (1.0 - cos) * pt;
        p.px = -sin / rc * x + cos * px - sin / bet * pt;
        p.y = y + rc * theta * py;
        p.py = py;
        p.t = sin / bet * x + rc / bet * (1.0 - cos) * px + t
            + rc * (-theta + sin / (bet * bet)) * pt;
        p.pt = pt;
    }

    fn push_ref(&self, refpart: &mut RefPart) {
        let h = self.slice_ds();
        let theta = h / self.rc;
        let b = (refpart.pt.powi(2) - 1.0).sqrt() / self.rc;
        let (sin, cos) = theta.sin_cos();

        let (px, pz) = (refpart.px, refpart.pz);
        refpart.px = px * cos - pz * sin;
        refpart.pz = pz * cos + px * sin;

        refpart.x += (refpart.pz - pz) / b;
        refpart.y += theta / b * refpart.py;
        refpart.z -= (refpart.px - px) / b;
        refpart.t -= theta / b * refpart.pt;
        refpart.s += h;
    }
}

/// Linear constant focusing in all three planes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstF {
    /// Segment length in m.
    pub ds: f64,
    /// Horizontal focusing strength in 1/m.
    pub kx: f64,
    /// Vertical focusing strength in 1/m.
    pub ky: f64,
    /// Longitudinal focusing strength in 1/m.
    pub kt: f64,
    /// Number of slices.
    #[serde(default = "default_nslice")]
    pub nslice: usize,
}

impl ConstF {
    /// Creates a constant focusing channel segment.
    pub fn new(ds: f64, kx: f64, ky: f64, kt: f64, nslice: usize) -> Result<Self, BeamError> {
        check_finite("ConstF", &[("ds", ds), ("kx", kx), ("ky", ky), ("kt", kt)])?;
        check_nslice("ConstF", nslice)?;
        Ok(Self {
            ds,
            kx,
            ky,
            kt,
            nslice,
        })
    }
}

impl BeamlineElement for ConstF {
    fn name(&self) -> &'static str {
        "ConstF"
    }

    fn ds(&self) -> f64 {
        self.ds
    }

    fn nslice(&self) -> usize {
        self.nslice
    }

    fn push_particle(&self, p: &mut PhaseSpace, refpart: &RefPart) {
        let h = self.slice_ds();
        let betgam2 = refpart.beta_gamma_sq();

        let (cx, sx, mx) = rotation(self.kx, h);
        let (cy, sy, my) = rotation(self.ky, h);
        let (ct, st, mt) = rotation(self.kt, h);

        let (x, px, y, py, t, pt) = (p.x, p.px, p.y, p.py, p.t, p.pt);
        p.x = cx * x + sx * px;
        p.px = mx * x + cx * px;
        p.y = cy * y + sy * py;
        p.py = my * y + cy * py;
        p.t = ct * t + st / betgam2 * pt;
        p.pt = mt * betgam2 * t + ct * pt;
    }

    fn push_ref(&self, refpart: &mut RefPart) {
        push_ref_straight(refpart, self.slice_ds());
    }
}
