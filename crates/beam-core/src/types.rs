use serde::{Deserialize, Serialize};

/// Six phase-space coordinates of one macro-particle.
///
/// At fixed `s` the triple `(t, pt)` is the time of flight (c * dt, in m) and
/// the energy deviation; after a transform to fixed `t` the same slots hold
/// `(z, pz)`. Transverse momenta are normalised to the reference momentum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseSpace {
    /// Horizontal position in m.
    pub x: f64,
    /// Vertical position in m.
    pub y: f64,
    /// Longitudinal coordinate in m.
    pub t: f64,
    /// Horizontal momentum.
    pub px: f64,
    /// Vertical momentum.
    pub py: f64,
    /// Longitudinal momentum or energy deviation.
    pub pt: f64,
}

impl PhaseSpace {
    /// Creates a coordinate sextuple.
    pub const fn new(x: f64, y: f64, t: f64, px: f64, py: f64, pt: f64) -> Self {
        Self {
            x,
            y,
            t,
            px,
            py,
            pt,
        }
    }

    /// Returns the coordinates in `[x, y, t, px, py, pt]` order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.t, self.px, self.py, self.pt]
    }

    /// Multiplies all six coordinates by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(
            factor * self.x,
            factor * self.y,
            factor * self.t,
            factor * self.px,
            factor * self.py,
            factor * self.pt,
        )
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|value| value.is_finite())
    }
}
