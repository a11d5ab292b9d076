#![deny(missing_docs)]
#![doc = "Particle shard I/O, beam moments, nonlinear-lens invariants and the reference-particle log."]

pub mod invariants;
pub mod moments;
pub mod reflog;
pub mod shard;
pub mod table;

pub use invariants::{InvariantValues, NonlinearLensInvariants};
pub use moments::{get_moments, BeamMoments, PHASE_SPACE_COLUMNS};
pub use reflog::{RefParticleLog, REF_PARTICLE_FILE};
pub use shard::{write_shard, write_shards, SHARD_COLUMNS};
pub use table::{discover, read_all_files, read_matching, BeamTable};
