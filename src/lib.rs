//! `phi-fit` library crate.
//!
//! The binary (`phifit`) is a thin wrapper around this library so that:
//!
//! - the lattice search is testable without spawning processes
//! - the fitting core (`math`, `fit`) stays free of I/O and CLI concerns

pub mod app;
pub mod catalog;
pub mod cli;
pub mod coverage;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
