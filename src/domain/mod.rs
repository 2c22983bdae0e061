//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input constants (`Constant`, `ConstantGroup`, `BuiltinSet`)
//! - lattice fits (`FitResult`, `DoubleFitResult`, `Evaluation`)
//! - tuning knobs (`FitOptions`, `SelectionPolicy`, `FitConfig`)
//! - the portable run file (`RunFile`)

pub mod types;

pub use types::*;
