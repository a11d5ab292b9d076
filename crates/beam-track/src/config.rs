use std::fs;
use std::path::{Path, PathBuf};

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::Species;
use beam_diag::NonlinearLensInvariants;
use beam_dist::KnownDistribution;
use beam_lattice::Element;
use serde::{Deserialize, Serialize};

/// YAML run description consumed by [`crate::Simulation::from_config`].
///
/// ```yaml
/// seed: 42
/// beam:
///   npart: 10000
///   charge: 1.0e-9
///   reference: { particle: proton, kin_energy_mev: 2000.0 }
///   distribution: { type: waterbag, sigmaX: 1.0e-3, ... }
/// lattice:
///   file: chicane.madx
///   nslice: 25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master seed; rank `r` samples from substream `r`.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Numerical algorithm switches.
    #[serde(default)]
    pub algo: AlgoConfig,
    /// Domain decomposition.
    #[serde(default)]
    pub decomposition: DecompositionConfig,
    /// Beam initialisation.
    pub beam: BeamConfig,
    /// Beamline description.
    pub lattice: LatticeConfig,
    /// Output control.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

fn default_seed() -> u64 {
    1
}

/// Numerical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoConfig {
    /// B-spline order of the charge deposition, 1 to 3.
    #[serde(default = "default_particle_shape")]
    pub particle_shape: u8,
    /// Space-charge push; only `false` is supported.
    #[serde(default)]
    pub space_charge: bool,
}

fn default_particle_shape() -> u8 {
    2
}

impl Default for AlgoConfig {
    fn default() -> Self {
        Self {
            particle_shape: default_particle_shape(),
            space_charge: false,
        }
    }
}

/// Number of particle tiles tracked in parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// Number of ranks, at least one.
    #[serde(default = "default_ranks")]
    pub ranks: usize,
}

fn default_ranks() -> usize {
    1
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            ranks: default_ranks(),
        }
    }
}

/// Reference particle given inline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Particle species.
    pub particle: Species,
    /// Kinetic energy in MeV.
    pub kin_energy_mev: f64,
}

/// Bunch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Number of macro-particles.
    pub npart: usize,
    /// Bunch charge in C.
    #[serde(default)]
    pub charge: f64,
    /// Inline reference particle.
    #[serde(default)]
    pub reference: Option<ReferenceConfig>,
    /// MAD-X file whose `beam` command defines the reference particle.
    #[serde(default)]
    pub reference_file: Option<PathBuf>,
    /// Distribution sampled for the particles.
    pub distribution: KnownDistribution,
}

/// Beamline given either inline or as a MAD-X file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Inline element list.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// MAD-X lattice file.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Slices per thick element for MAD-X lattices.
    #[serde(default = "default_nslice")]
    pub nslice: usize,
    /// Line to expand instead of the file's selected one.
    #[serde(default)]
    pub sequence: Option<String>,
}

fn default_nslice() -> usize {
    1
}

/// Output written during `evolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Write initial and final beam shards.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Log the reference particle after every slice.
    #[serde(default)]
    pub slice_step: bool,
    /// Output directory.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Write nonlinear-lens invariants next to the beam shards.
    #[serde(default)]
    pub invariants: Option<NonlinearLensInvariants>,
}

fn default_enabled() -> bool {
    true
}

fn default_directory() -> PathBuf {
    PathBuf::from("diags")
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            slice_step: false,
            directory: default_directory(),
            invariants: None,
        }
    }
}

fn config_error(code: &str, message: impl Into<String>) -> BeamError {
    BeamError::Config(ErrorInfo::new(code, message))
}

impl SimConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, BeamError> {
        let config: SimConfig = serde_yaml::from_str(text)
            .map_err(|err| BeamError::Serde(ErrorInfo::new("config-yaml", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file; relative input paths resolve against its directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| BeamError::io("config-read", path, err))?;
        let mut config = Self::from_yaml_str(&text).map_err(|err| match err {
            BeamError::Serde(info) => {
                BeamError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_inputs(base);
        }
        Ok(config)
    }

    /// Rewrites relative lattice and reference paths against `base`.
    pub fn resolve_inputs(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(file) = self.lattice.file.as_mut() {
            resolve(file);
        }
        if let Some(file) = self.beam.reference_file.as_mut() {
            resolve(file);
        }
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), BeamError> {
        if self.decomposition.ranks == 0 {
            return Err(config_error("zero-ranks", "decomposition needs at least one rank"));
        }
        if !self.beam.charge.is_finite() {
            return Err(BeamError::Config(
                ErrorInfo::new("bunch-charge", "bunch charge must be finite")
                    .with_context("charge", self.beam.charge.to_string()),
            ));
        }
        match (&self.beam.reference, &self.beam.reference_file) {
            (Some(_), Some(_)) => {
                return Err(config_error(
                    "reference-ambiguous",
                    "give either beam.reference or beam.reference_file, not both",
                ))
            }
            (None, None) => {
                return Err(BeamError::Config(
                    ErrorInfo::new("reference-missing", "no reference particle configured")
                        .with_hint("set beam.reference or beam.reference_file"),
                ))
            }
            _ => {}
        }
        self.beam.distribution.validate()?;
        match (self.lattice.elements.is_empty(), &self.lattice.file) {
            (false, Some(_)) => {
                return Err(config_error(
                    "lattice-ambiguous",
                    "give either lattice.elements or lattice.file, not both",
                ))
            }
            (true, None) => {
                return Err(BeamError::Config(
                    ErrorInfo::new("lattice-missing", "no lattice configured")
                        .with_hint("set lattice.elements or lattice.file"),
                ))
            }
            _ => {}
        }
        if self.lattice.nslice == 0 {
            return Err(config_error("zero-slices", "lattice.nslice must be at least 1"));
        }
        if let Some(invariants) = &self.diagnostics.invariants {
            invariants.validate()?;
        }
        Ok(())
    }
}
