//! Reference particle carried alongside every bunch.

use serde::{Deserialize, Serialize};

use crate::errors::{BeamError, ErrorInfo};

/// Rest energy equivalent of one kilogram, expressed as kg per MeV/c^2.
pub const MEV_C2_KG: f64 = 1.782_661_92e-30;
/// Elementary charge in coulomb.
pub const ELEMENTARY_CHARGE_C: f64 = 1.602_176_634e-19;

/// Particle species with tabulated rest mass and charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Electron.
    Electron,
    /// Positron.
    Positron,
    /// Proton.
    Proton,
    /// Antiproton.
    Antiproton,
    /// Positive muon.
    Posmuon,
    /// Negative muon.
    Negmuon,
}

impl Species {
    /// Rest mass in MeV/c^2.
    pub fn mass_mev(&self) -> f64 {
        match self {
            Species::Electron | Species::Positron => 0.510_998_950_00,
            Species::Proton | Species::Antiproton => 938.272_088_16,
            Species::Posmuon | Species::Negmuon => 105.658_375_5,
        }
    }

    /// Charge in multiples of the elementary charge.
    pub fn charge_qe(&self) -> f64 {
        match self {
            Species::Electron | Species::Antiproton | Species::Negmuon => -1.0,
            Species::Positron | Species::Proton | Species::Posmuon => 1.0,
        }
    }

    /// Parses a MAD-X style particle name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "electron" => Some(Species::Electron),
            "positron" => Some(Species::Positron),
            "proton" => Some(Species::Proton),
            "antiproton" => Some(Species::Antiproton),
            "posmuon" => Some(Species::Posmuon),
            "negmuon" => Some(Species::Negmuon),
            _ => None,
        }
    }
}

/// Reference particle attributes.
///
/// Momenta are normalised to `m c`; `pt` is the negative relativistic gamma,
/// so a particle at rest has `pt = -1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefPart {
    /// Integrated orbit path length in m.
    pub s: f64,
    /// Horizontal position in m.
    pub x: f64,
    /// Vertical position in m.
    pub y: f64,
    /// Longitudinal position in m.
    pub z: f64,
    /// Clock time times c in m.
    pub t: f64,
    /// Momentum in x, normalised to proper velocity.
    pub px: f64,
    /// Momentum in y, normalised to proper velocity.
    pub py: f64,
    /// Momentum in z, normalised to proper velocity.
    pub pz: f64,
    /// Energy deviation normalised by rest energy.
    pub pt: f64,
    /// Rest mass in kg.
    pub mass: f64,
    /// Charge in C.
    pub charge: f64,
}

fn physics_error(code: &str, message: impl Into<String>) -> BeamError {
    BeamError::Physics(ErrorInfo::new(code, message))
}

impl RefPart {
    /// Builds a reference particle for `species` with the given kinetic energy.
    pub fn for_species(species: Species, kinetic_energy_mev: f64) -> Result<Self, BeamError> {
        let mut refpart = RefPart::default();
        refpart
            .set_charge_qe(species.charge_qe())
            .set_mass_mev(species.mass_mev())?
            .set_energy_mev(kinetic_energy_mev)?;
        Ok(refpart)
    }

    /// Relativistic gamma.
    pub fn gamma(&self) -> f64 {
        -self.pt
    }

    /// Relativistic beta.
    pub fn beta(&self) -> f64 {
        let gamma = self.gamma();
        (1.0 - 1.0 / gamma.powi(2)).sqrt()
    }

    /// Relativistic beta * gamma.
    pub fn beta_gamma(&self) -> f64 {
        (self.gamma().powi(2) - 1.0).sqrt()
    }

    /// `(beta * gamma)^2`, the factor used by the longitudinal element maps.
    pub fn beta_gamma_sq(&self) -> f64 {
        self.pt.powi(2) - 1.0
    }

    /// Rest mass in MeV/c^2.
    pub fn mass_mev(&self) -> f64 {
        self.mass / MEV_C2_KG
    }

    /// Sets the rest mass in MeV/c^2.
    ///
    /// When `pt` is already set it is recomputed from the kinetic energy at
    /// the new mass, so gamma is kept and the kinetic energy scales with the
    /// mass.
    pub fn set_mass_mev(&mut self, mass_mev: f64) -> Result<&mut Self, BeamError> {
        if mass_mev == 0.0 || !mass_mev.is_finite() {
            return Err(physics_error(
                "zero-mass",
                "set_mass_mev: mass must be finite and non-zero",
            ));
        }
        self.mass = mass_mev * MEV_C2_KG;
        if self.pt != 0.0 {
            self.pt = -self.energy_mev() / mass_mev - 1.0;
            self.pz = (self.pt.powi(2) - 1.0).sqrt();
        }
        Ok(self)
    }

    /// Kinetic energy in MeV.
    pub fn energy_mev(&self) -> f64 {
        self.mass_mev() * (self.gamma() - 1.0)
    }

    /// Sets the kinetic energy in MeV; the mass must be set first.
    pub fn set_energy_mev(&mut self, energy_mev: f64) -> Result<&mut Self, BeamError> {
        if self.mass == 0.0 {
            return Err(physics_error(
                "mass-unset",
                "set_energy_mev: set the mass before the energy",
            ));
        }
        if !(energy_mev > 0.0) || !energy_mev.is_finite() {
            return Err(BeamError::Physics(
                ErrorInfo::new("invalid-energy", "kinetic energy must be positive")
                    .with_context("energy_mev", energy_mev.to_string()),
            ));
        }
        self.px = 0.0;
        self.py = 0.0;
        self.pt = -energy_mev / self.mass_mev() - 1.0;
        self.pz = (self.pt.powi(2) - 1.0).sqrt();
        Ok(self)
    }

    /// Charge in multiples of the (positive) elementary charge.
    pub fn charge_qe(&self) -> f64 {
        self.charge / ELEMENTARY_CHARGE_C
    }

    /// Sets the charge in multiples of the (positive) elementary charge.
    pub fn set_charge_qe(&mut self, charge_qe: f64) -> &mut Self {
        self.charge = charge_qe * ELEMENTARY_CHARGE_C;
        self
    }

    /// Charge to mass ratio in C/kg.
    pub fn qm_ratio(&self) -> f64 {
        self.charge / self.mass
    }
}
