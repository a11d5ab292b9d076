#![deny(missing_docs)]
#![doc = "Beamline elements, lattice containers and a MAD-X subset loader."]

pub mod element;
pub mod lattice;
pub mod madx;
pub mod thick;
pub mod thin;

pub use element::{BeamlineElement, Element};
pub use lattice::Lattice;
pub use madx::{load_lattice_file, load_ref_particle_file, AttrValue, ElementDef, MadxDeck};
pub use thick::{ConstF, Drift, Quad, Sbend};
pub use thin::{DipEdge, Marker, Multipole, NonlinearLens, ShortRF};
