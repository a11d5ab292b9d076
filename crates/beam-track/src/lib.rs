#![deny(missing_docs)]
#![doc = "Simulation driver for beam tracking: run configuration, domain decomposition, coordinate transforms and the slice-by-slice `evolve` loop."]

/// YAML run configuration and defaults.
pub mod config;
/// The tracking driver and its summary.
pub mod simulation;
/// Fixed-`s` and fixed-`t` coordinate transforms.
pub mod transforms;

pub use config::{
    AlgoConfig, BeamConfig, DecompositionConfig, DiagnosticsConfig, LatticeConfig,
    ReferenceConfig, SimConfig,
};
pub use simulation::{EvolveSummary, Simulation, FINAL_STEM, INITIAL_STEM};
pub use transforms::{to_fixed_s, to_fixed_t, transform_bunch, Direction};

/// Runs a configuration end to end.
pub fn run(config: &SimConfig) -> Result<EvolveSummary, beam_core::BeamError> {
    Simulation::from_config(config)?.evolve()
}
