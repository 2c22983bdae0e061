//! Mathematical utilities: golden-ratio lattice arithmetic.

pub mod lattice;

pub use lattice::*;
