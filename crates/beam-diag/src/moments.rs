//! Second moments and RMS emittances of a beam snapshot.

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::PhaseSpace;
use nalgebra::{Matrix6, Vector6};
use serde::{Deserialize, Serialize};

use crate::table::BeamTable;

/// Coordinate order of [`BeamMoments`] vectors and matrix rows.
pub const PHASE_SPACE_COLUMNS: [&str; 6] = ["x", "y", "t", "px", "py", "pt"];

/// Population statistics of the six phase-space coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamMoments {
    /// Number of particles the statistics were computed from.
    pub count: usize,
    /// Means in `x, y, t, px, py, pt` order.
    pub means: [f64; 6],
    /// RMS values (square roots of the second central moments).
    pub sigmas: [f64; 6],
    /// Covariance matrix normalised by `n`.
    pub covariance: Matrix6<f64>,
    /// RMS emittances of the `(x, px)`, `(y, py)` and `(t, pt)` planes.
    pub emittances: [f64; 3],
}

impl BeamMoments {
    /// Computes the moments of an iterator of coordinates.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a PhaseSpace>) -> Result<Self, BeamError> {
        let rows: Vec<Vector6<f64>> = coords
            .into_iter()
            .map(|p| Vector6::from(p.to_array()))
            .collect();
        Self::from_rows(&rows)
    }

    fn from_rows(rows: &[Vector6<f64>]) -> Result<Self, BeamError> {
        if rows.is_empty() {
            return Err(BeamError::Check(ErrorInfo::new(
                "empty-beam",
                "cannot compute moments of an empty beam",
            )));
        }
        let n = rows.len() as f64;
        let mean = rows.iter().fold(Vector6::zeros(), |acc, row| acc + row) / n;
        let covariance = rows.iter().fold(Matrix6::zeros(), |acc, row| {
            let d = row - mean;
            acc + d * d.transpose()
        }) / n;

        let sigmas: [f64; 6] = std::array::from_fn(|i| covariance[(i, i)].sqrt());
        let emittances: [f64; 3] = std::array::from_fn(|plane| {
            let (q, p) = (plane, plane + 3);
            let radicand = sigmas[q].powi(2) * sigmas[p].powi(2) - covariance[(q, p)].powi(2);
            radicand.max(0.0).sqrt()
        });
        Ok(Self {
            count: rows.len(),
            means: std::array::from_fn(|i| mean[i]),
            sigmas,
            covariance,
            emittances,
        })
    }

    /// `(sigx, sigy, sigt, emittance_x, emittance_y, emittance_t)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.sigmas[0],
            self.sigmas[1],
            self.sigmas[2],
            self.emittances[0],
            self.emittances[1],
            self.emittances[2],
        )
    }

    /// The six statistics of [`BeamMoments::as_tuple`] as an array.
    pub fn statistics(&self) -> [f64; 6] {
        let (a, b, c, d, e, f) = self.as_tuple();
        [a, b, c, d, e, f]
    }
}

/// Moments of a beam table with at least the six phase-space columns.
pub fn get_moments(table: &BeamTable) -> Result<BeamMoments, BeamError> {
    table.require_columns(&PHASE_SPACE_COLUMNS)?;
    let columns: Vec<&[f64]> = PHASE_SPACE_COLUMNS
        .iter()
        .filter_map(|name| table.column(name))
        .collect();
    let rows: Vec<Vector6<f64>> = (0..table.len())
        .map(|row| Vector6::from_fn(|i, _| columns[i][row]))
        .collect();
    BeamMoments::from_rows(&rows)
}
