#![deny(missing_docs)]
#![doc = "Six-dimensional particle distributions used to initialise a beam."]

pub mod known;
pub mod params;
pub mod shapes;

pub use known::KnownDistribution;
pub use params::BeamParams;
pub use shapes::{BeamDistribution, Gaussian, KVdist, Kurth4D, Kurth6D, Semigaussian, Waterbag};
