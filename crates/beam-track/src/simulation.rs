//! The tracking driver.
//!
//! Calls follow the order of a run script: numerical switches, then
//! [`Simulation::init_grids`], then the reference particle, the bunch and the
//! lattice, and finally [`Simulation::evolve`].

use std::fs;
use std::path::{Path, PathBuf};

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{ParticleBunch, RefPart, RngHandle, RunProvenance};
use beam_diag::{write_shards, NonlinearLensInvariants, RefParticleLog};
use beam_dist::KnownDistribution;
use beam_lattice::{load_ref_particle_file, BeamlineElement, Lattice, MadxDeck};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Stem of the shards written before tracking.
pub const INITIAL_STEM: &str = "beam_000000";
/// Stem of the shards written after tracking.
pub const FINAL_STEM: &str = "beam_final";
const INVARIANTS_STEM: &str = "nonlinear_lens_invariants";

/// Result of [`Simulation::evolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolveSummary {
    /// Number of lattice elements traversed.
    pub elements: usize,
    /// Number of slice steps taken.
    pub steps: usize,
    /// Path length of the reference particle at the end.
    pub final_s: f64,
    /// Number of macro-particles tracked.
    pub particles: usize,
    /// Number of decomposition ranks.
    pub ranks: usize,
    /// Reference particle after the last step.
    pub ref_particle: RefPart,
    /// Every file written to the diagnostics directory.
    pub outputs: Vec<PathBuf>,
    /// Seed, input hash and tool versions.
    pub provenance: RunProvenance,
}

/// Settings hashed into the provenance of runs not built from a [`SimConfig`].
#[derive(Serialize)]
struct DriverInputs<'a> {
    seed: u64,
    ranks: usize,
    particle_shape: u8,
    particles: usize,
    ref_particle: &'a RefPart,
    lattice: &'a Lattice,
}

/// A beam tracking run.
#[derive(Debug, Clone)]
pub struct Simulation {
    seed: u64,
    ranks: usize,
    particle_shape: u8,
    diagnostics: bool,
    slice_step_diagnostics: bool,
    diag_dir: PathBuf,
    invariants: Option<NonlinearLensInvariants>,
    bunch: Option<ParticleBunch>,
    lattice: Lattice,
    config: Option<SimConfig>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(1)
    }
}

fn not_initialised() -> BeamError {
    BeamError::Config(
        ErrorInfo::new("grids-uninitialised", "the domain decomposition is not initialised")
            .with_hint("call init_grids before adding particles or a lattice"),
    )
}

fn already_initialised(setting: &str) -> BeamError {
    BeamError::Config(
        ErrorInfo::new("grids-initialised", "setting must be changed before init_grids")
            .with_context("setting", setting),
    )
}

impl Simulation {
    /// Creates a single-rank simulation with diagnostics enabled.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ranks: 1,
            particle_shape: 2,
            diagnostics: true,
            slice_step_diagnostics: false,
            diag_dir: PathBuf::from("diags"),
            invariants: None,
            bunch: None,
            lattice: Lattice::default(),
            config: None,
        }
    }

    /// Builds a simulation ready to [`evolve`](Self::evolve) from a run configuration.
    pub fn from_config(config: &SimConfig) -> Result<Self, BeamError> {
        config.validate()?;
        let mut sim = Self::new(config.seed);
        sim.set_particle_shape(config.algo.particle_shape)?;
        sim.set_space_charge(config.algo.space_charge)?;
        sim.set_ranks(config.decomposition.ranks)?;
        sim.set_diagnostics(config.diagnostics.enabled);
        sim.set_slice_step_diagnostics(config.diagnostics.slice_step);
        sim.set_diag_dir(&config.diagnostics.directory);
        sim.set_invariants(config.diagnostics.invariants)?;
        sim.init_grids()?;

        match (&config.beam.reference, &config.beam.reference_file) {
            (Some(reference), _) => {
                sim.set_ref_particle(RefPart::for_species(
                    reference.particle,
                    reference.kin_energy_mev,
                )?)?;
            }
            (None, Some(path)) => {
                sim.load_ref_particle_file(path)?;
            }
            (None, None) => return Err(BeamError::Config(ErrorInfo::new(
                "reference-missing",
                "no reference particle configured",
            ))),
        }
        sim.add_particles(config.beam.charge, &config.beam.distribution, config.beam.npart)?;

        match &config.lattice.file {
            Some(path) => {
                let deck = MadxDeck::from_file(path)?;
                let lattice = match &config.lattice.sequence {
                    Some(name) => deck.lattice_for(name, config.lattice.nslice)?,
                    None => deck.lattice(config.lattice.nslice)?,
                };
                sim.set_lattice(lattice)?;
            }
            None => sim.set_lattice(Lattice::new(config.lattice.elements.clone())?)?,
        }
        sim.config = Some(config.clone());
        Ok(sim)
    }

    /// Master seed of the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sets the number of decomposition ranks.
    pub fn set_ranks(&mut self, ranks: usize) -> Result<(), BeamError> {
        if self.bunch.is_some() {
            return Err(already_initialised("ranks"));
        }
        if ranks == 0 {
            return Err(BeamError::Config(ErrorInfo::new(
                "zero-ranks",
                "decomposition needs at least one rank",
            )));
        }
        self.ranks = ranks;
        Ok(())
    }

    /// Sets the B-spline order used for charge deposition.
    pub fn set_particle_shape(&mut self, order: u8) -> Result<(), BeamError> {
        if self.bunch.is_some() {
            return Err(already_initialised("particle_shape"));
        }
        if !(1..=3).contains(&order) {
            return Err(BeamError::Config(
                ErrorInfo::new("shape-order", "particle shape order must be 1, 2 or 3")
                    .with_context("requested", order.to_string()),
            ));
        }
        self.particle_shape = order;
        Ok(())
    }

    /// Enables or disables the space-charge push. Only `false` is accepted.
    pub fn set_space_charge(&mut self, enabled: bool) -> Result<(), BeamError> {
        if enabled {
            return Err(BeamError::Config(
                ErrorInfo::new("space-charge-unsupported", "space charge is not implemented")
                    .with_hint("set algo.space_charge to false"),
            ));
        }
        Ok(())
    }

    /// Enables writing the initial and final beam.
    pub fn set_diagnostics(&mut self, enabled: bool) {
        self.diagnostics = enabled;
    }

    /// Enables logging the reference particle after every slice.
    pub fn set_slice_step_diagnostics(&mut self, enabled: bool) {
        self.slice_step_diagnostics = enabled;
    }

    /// Directory receiving all diagnostics.
    pub fn set_diag_dir(&mut self, dir: impl AsRef<Path>) {
        self.diag_dir = dir.as_ref().to_path_buf();
    }

    /// Current diagnostics directory.
    pub fn diag_dir(&self) -> &Path {
        &self.diag_dir
    }

    /// Enables writing nonlinear-lens invariants alongside the beam.
    pub fn set_invariants(
        &mut self,
        invariants: Option<NonlinearLensInvariants>,
    ) -> Result<(), BeamError> {
        if let Some(invariants) = &invariants {
            invariants.validate()?;
        }
        self.invariants = invariants;
        Ok(())
    }

    /// Builds one particle tile per rank. Must be called exactly once.
    pub fn init_grids(&mut self) -> Result<(), BeamError> {
        if self.bunch.is_some() {
            return Err(already_initialised("grids"));
        }
        let mut bunch = ParticleBunch::new(self.ranks);
        bunch.set_particle_shape(self.particle_shape)?;
        self.bunch = Some(bunch);
        info!(
            "initialised {} rank(s) with particle shape {}",
            self.ranks, self.particle_shape
        );
        Ok(())
    }

    /// The particle container, once grids are initialised.
    pub fn particle_container(&self) -> Option<&ParticleBunch> {
        self.bunch.as_ref()
    }

    fn bunch_mut(&mut self) -> Result<&mut ParticleBunch, BeamError> {
        self.bunch.as_mut().ok_or_else(not_initialised)
    }

    /// Replaces the reference particle.
    pub fn set_ref_particle(&mut self, refpart: RefPart) -> Result<(), BeamError> {
        self.bunch_mut()?.set_ref_particle(refpart);
        Ok(())
    }

    /// Loads the reference particle from the `beam` command of a MAD-X file.
    pub fn load_ref_particle_file(&mut self, path: impl AsRef<Path>) -> Result<&RefPart, BeamError> {
        let refpart = load_ref_particle_file(path)?;
        let bunch = self.bunch_mut()?;
        bunch.set_ref_particle(refpart);
        Ok(bunch.ref_particle())
    }

    /// Samples `npart` particles of `dist` with a total charge `bunch_charge` in C.
    ///
    /// Rank `r` receives `npart / ranks` particles, plus one for the first
    /// `npart % ranks` ranks, drawn from substream `r` of the master seed.
    /// Returns the number of particles added.
    pub fn add_particles(
        &mut self,
        bunch_charge: f64,
        dist: &KnownDistribution,
        npart: usize,
    ) -> Result<usize, BeamError> {
        let seed = self.seed;
        let bunch = self.bunch.as_mut().ok_or_else(not_initialised)?;
        if bunch.ref_particle().mass == 0.0 {
            return Err(BeamError::Config(
                ErrorInfo::new("refpart-unset", "reference particle must be set before particles")
                    .with_hint("call set_ref_particle or load_ref_particle_file first"),
            ));
        }
        dist.validate()?;
        if npart == 0 || matches!(dist, KnownDistribution::Empty) {
            warn!("no particles added ({} distribution, npart={npart})", dist.name());
            return Ok(0);
        }

        let ranks = bunch.ranks();
        let counts: Vec<usize> = (0..ranks)
            .map(|rank| npart / ranks + usize::from(rank < npart % ranks))
            .collect();
        let sampled = counts
            .par_iter()
            .enumerate()
            .map(|(rank, &count)| {
                let mut rng = RngHandle::substream(seed, rank as u64);
                dist.generate(count, &mut rng)
            })
            .collect::<Result<Vec<_>, BeamError>>()?;

        let qm = bunch.ref_particle().qm_ratio();
        for (rank, coords) in sampled.into_iter().enumerate() {
            let share = bunch_charge * coords.len() as f64 / npart as f64;
            bunch.add_particles(rank, coords, qm, share)?;
        }
        info!(
            "added {npart} {} particles across {ranks} rank(s)",
            dist.name()
        );
        Ok(npart)
    }

    /// Loads the selected beamline of a MAD-X file.
    pub fn load_lattice_file(&mut self, path: impl AsRef<Path>, nslice: usize) -> Result<(), BeamError> {
        let lattice = beam_lattice::load_lattice_file(path, nslice)?;
        self.set_lattice(lattice)
    }

    /// Replaces the lattice.
    pub fn set_lattice(&mut self, lattice: Lattice) -> Result<(), BeamError> {
        self.bunch_mut()?;
        info!(
            "lattice of {} element(s), length {} m, {} slice step(s)",
            lattice.len(),
            lattice.total_length(),
            lattice.total_slices()
        );
        self.lattice = lattice;
        Ok(())
    }

    /// The lattice tracked by [`evolve`](Self::evolve).
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn write_snapshot(&self, bunch: &ParticleBunch, stem: &str) -> Result<Vec<PathBuf>, BeamError> {
        let mut paths = write_shards(&self.diag_dir, stem, bunch)?;
        if let Some(invariants) = &self.invariants {
            let suffix = stem.trim_start_matches("beam_");
            for (rank, tile) in bunch.tiles().iter().enumerate() {
                let path = self
                    .diag_dir
                    .join(format!("{INVARIANTS_STEM}_{suffix}.{rank}"));
                invariants.write(&path, tile)?;
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Tracks the bunch through every slice of every element.
    ///
    /// Within a slice all particles are pushed with the reference particle as
    /// it was at the start of the slice; the reference particle is advanced
    /// afterwards.
    pub fn evolve(&mut self) -> Result<EvolveSummary, BeamError> {
        let mut bunch = self.bunch.take().ok_or_else(not_initialised)?;
        let result = self.track(&mut bunch);
        self.bunch = Some(bunch);
        result
    }

    fn track(&self, bunch: &mut ParticleBunch) -> Result<EvolveSummary, BeamError> {
        if bunch.ref_particle().mass == 0.0 {
            return Err(BeamError::Config(ErrorInfo::new(
                "refpart-unset",
                "reference particle must be set before evolve",
            )));
        }
        if self.lattice.is_empty() {
            warn!("evolving through an empty lattice");
        }
        info!(
            "tracking {} particle(s) through {} element(s)",
            bunch.len(),
            self.lattice.len()
        );

        let mut outputs = Vec::new();
        let mut reflog = None;
        if self.diagnostics {
            fs::create_dir_all(&self.diag_dir)
                .map_err(|err| BeamError::io("diag-mkdir", &self.diag_dir, err))?;
            outputs.extend(self.write_snapshot(bunch, INITIAL_STEM)?);
            if self.slice_step_diagnostics {
                let mut log = RefParticleLog::create(&self.diag_dir)?;
                log.append(0, bunch.ref_particle())?;
                reflog = Some(log);
            }
        }

        let mut steps = 0;
        for (index, element) in self.lattice.iter().enumerate() {
            for _ in 0..element.nslice() {
                let refpart = *bunch.ref_particle();
                bunch.tiles_mut().par_iter_mut().for_each(|tile| {
                    for p in tile.coords.iter_mut() {
                        element.push_particle(p, &refpart);
                    }
                });
                element.push_ref(bunch.ref_particle_mut());
                steps += 1;
                if let Some(log) = reflog.as_mut() {
                    log.append(steps, bunch.ref_particle())?;
                }
            }
            debug!(
                "element {index} ({}) done, s = {}",
                element.name(),
                bunch.ref_particle().s
            );
        }

        if self.diagnostics {
            outputs.extend(self.write_snapshot(bunch, FINAL_STEM)?);
        }
        if let Some(mut log) = reflog {
            log.flush()?;
            outputs.push(log.path().to_path_buf());
        }

        let provenance = match &self.config {
            Some(config) => RunProvenance::for_input(config, self.seed)?,
            None => RunProvenance::for_input(
                &DriverInputs {
                    seed: self.seed,
                    ranks: bunch.ranks(),
                    particle_shape: self.particle_shape,
                    particles: bunch.len(),
                    ref_particle: bunch.ref_particle(),
                    lattice: &self.lattice,
                },
                self.seed,
            )?,
        };
        let summary = EvolveSummary {
            elements: self.lattice.len(),
            steps,
            final_s: bunch.ref_particle().s,
            particles: bunch.len(),
            ranks: bunch.ranks(),
            ref_particle: *bunch.ref_particle(),
            outputs,
            provenance,
        };
        info!(
            "evolve finished after {} step(s) at s = {} m",
            summary.steps, summary.final_s
        );
        Ok(summary)
    }
}
