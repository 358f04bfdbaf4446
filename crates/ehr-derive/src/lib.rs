//! Derivation engine: turns typed intermediate tables into canonical
//! per-domain event tables.
//!
//! The three sub-derivations (hospital, primary care, mortality) consume
//! disjoint standardized tables and write disjoint outputs; a failure in
//! one cannot corrupt another's results.

pub mod death;
pub mod gp;
pub mod hospital;
pub mod io;

pub use death::derive_death;
pub use gp::derive_gp;
pub use hospital::derive_hospital;
pub use io::{DerivedTable, read_standardized, write_canonical};
