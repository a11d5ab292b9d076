#![deny(missing_docs)]
#![doc = "Core types for the beam tracking engine: structured errors, deterministic RNG, the reference particle and macro-particle storage."]

pub mod bunch;
pub mod errors;
pub mod provenance;
pub mod refpart;
pub mod rng;
mod types;

pub use bunch::{ParticleBunch, ParticleTile, PositionBounds, PositionStats};
pub use errors::{BeamError, BeamResult, ErrorInfo};
pub use provenance::{stable_hash_string, RunProvenance, SchemaVersion};
pub use refpart::{RefPart, Species, ELEMENTARY_CHARGE_C, MEV_C2_KG};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::PhaseSpace;
