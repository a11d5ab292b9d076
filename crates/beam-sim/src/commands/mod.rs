pub mod analyze;
pub mod lattice;
pub mod moments;
pub mod run;
