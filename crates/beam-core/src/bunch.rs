//! Macro-particle storage split into per-rank tiles.

use serde::{Deserialize, Serialize};

use crate::errors::{BeamError, ErrorInfo};
use crate::refpart::RefPart;
use crate::types::PhaseSpace;

/// Particles owned by one rank of the domain decomposition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleTile {
    /// Globally unique particle identifiers.
    pub ids: Vec<u64>,
    /// Phase-space coordinates, parallel to `ids`.
    pub coords: Vec<PhaseSpace>,
    /// Charge to mass ratio per particle in C/kg.
    pub qm: Vec<f64>,
    /// Number of physical particles represented by each macro-particle.
    pub weights: Vec<f64>,
}

impl ParticleTile {
    /// Number of macro-particles in the tile.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the tile holds no particles.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over `(id, coordinates)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &PhaseSpace)> + '_ {
        self.ids.iter().copied().zip(self.coords.iter())
    }
}

/// Beam particles together with their reference particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleBunch {
    refpart: RefPart,
    tiles: Vec<ParticleTile>,
    particle_shape: Option<u8>,
    next_id: u64,
}

/// Axis-aligned extent of the particle positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionBounds {
    /// Minimum `(x, y, t)`.
    pub min: [f64; 3],
    /// Maximum `(x, y, t)`.
    pub max: [f64; 3],
}

/// Mean and population standard deviation of the particle positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    /// Mean `(x, y, t)`.
    pub mean: [f64; 3],
    /// Standard deviation `(x, y, t)`.
    pub std: [f64; 3],
}

fn bunch_error(code: &str, message: impl Into<String>) -> BeamError {
    BeamError::Config(ErrorInfo::new(code, message))
}

impl ParticleBunch {
    /// Creates an empty bunch with `ranks` tiles.
    pub fn new(ranks: usize) -> Self {
        Self {
            refpart: RefPart::default(),
            tiles: vec![ParticleTile::default(); ranks.max(1)],
            particle_shape: None,
            next_id: 1,
        }
    }

    /// Appends particles to the tile of `rank`.
    ///
    /// Each macro-particle receives the weight
    /// `bunch_charge / (|q_ref| * n)` where `n` is the number of particles in
    /// this call, and identifiers continue from the last assigned one.
    pub fn add_particles(
        &mut self,
        rank: usize,
        coords: Vec<PhaseSpace>,
        qm: f64,
        bunch_charge: f64,
    ) -> Result<(), BeamError> {
        if coords.is_empty() {
            return Ok(());
        }
        let ranks = self.tiles.len();
        let charge = self.refpart.charge.abs();
        if charge == 0.0 {
            return Err(bunch_error(
                "refpart-unset",
                "reference particle charge must be set before adding particles",
            ));
        }
        let tile = self.tiles.get_mut(rank).ok_or_else(|| {
            BeamError::Config(
                ErrorInfo::new("rank-out-of-range", "no tile for requested rank")
                    .with_context("rank", rank.to_string())
                    .with_context("ranks", ranks.to_string()),
            )
        })?;
        let count = coords.len();
        let weight = bunch_charge / (charge * count as f64);
        tile.ids.extend(self.next_id..self.next_id + count as u64);
        tile.coords.extend(coords);
        tile.qm.extend(std::iter::repeat(qm).take(count));
        tile.weights.extend(std::iter::repeat(weight).take(count));
        self.next_id += count as u64;
        Ok(())
    }

    /// Total number of macro-particles across all tiles.
    pub fn len(&self) -> usize {
        self.tiles.iter().map(ParticleTile::len).sum()
    }

    /// Whether the bunch holds no particles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of decomposition ranks.
    pub fn ranks(&self) -> usize {
        self.tiles.len()
    }

    /// Read access to the per-rank tiles.
    pub fn tiles(&self) -> &[ParticleTile] {
        &self.tiles
    }

    /// Mutable access to the per-rank tiles.
    pub fn tiles_mut(&mut self) -> &mut [ParticleTile] {
        &mut self.tiles
    }

    /// Iterates over every particle coordinate in rank order.
    pub fn coords(&self) -> impl Iterator<Item = &PhaseSpace> + '_ {
        self.tiles.iter().flat_map(|tile| tile.coords.iter())
    }

    /// Returns the reference particle.
    pub fn ref_particle(&self) -> &RefPart {
        &self.refpart
    }

    /// Returns the reference particle for in-place updates.
    pub fn ref_particle_mut(&mut self) -> &mut RefPart {
        &mut self.refpart
    }

    /// Replaces the reference particle.
    pub fn set_ref_particle(&mut self, refpart: RefPart) {
        self.refpart = refpart;
    }

    /// Particle shape order used for charge deposition, if set.
    pub fn particle_shape(&self) -> Option<u8> {
        self.particle_shape
    }

    /// Sets the particle shape order; only orders 1 to 3, and only once.
    pub fn set_particle_shape(&mut self, order: u8) -> Result<(), BeamError> {
        if let Some(existing) = self.particle_shape {
            return Err(BeamError::Config(
                ErrorInfo::new("shape-already-set", "particle shape can only be set once")
                    .with_context("existing", existing.to_string())
                    .with_context("requested", order.to_string()),
            ));
        }
        if !(1..=3).contains(&order) {
            return Err(BeamError::Config(
                ErrorInfo::new("shape-order", "particle shape order must be 1, 2 or 3")
                    .with_context("requested", order.to_string()),
            ));
        }
        self.particle_shape = Some(order);
        Ok(())
    }

    /// Minimum and maximum particle positions per dimension.
    pub fn min_and_max_positions(&self) -> Option<PositionBounds> {
        let mut coords = self.coords();
        let first = coords.next()?;
        let mut min = [first.x, first.y, first.t];
        let mut max = min;
        for p in coords {
            for (dim, value) in [p.x, p.y, p.t].into_iter().enumerate() {
                min[dim] = min[dim].min(value);
                max[dim] = max[dim].max(value);
            }
        }
        Some(PositionBounds { min, max })
    }

    /// Mean and population standard deviation of positions per dimension.
    pub fn mean_and_std_positions(&self) -> Option<PositionStats> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let mut sum = [0.0; 3];
        let mut sum_sq = [0.0; 3];
        for p in self.coords() {
            for (dim, value) in [p.x, p.y, p.t].into_iter().enumerate() {
                sum[dim] += value;
                sum_sq[dim] += value * value;
            }
        }
        let n = n as f64;
        let mean = sum.map(|s| s / n);
        let mut std = [0.0; 3];
        for dim in 0..3 {
            std[dim] = (sum_sq[dim] / n - mean[dim].powi(2)).max(0.0).sqrt();
        }
        Some(PositionStats { mean, std })
    }
}
