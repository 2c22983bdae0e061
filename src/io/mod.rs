//! Input/output helpers.
//!
//! - CSV/text ingest + validation (`ingest`)
//! - per-constant CSV export (`export`)
//! - run JSON read/write (`run_file`)

pub mod export;
pub mod ingest;
pub mod run_file;

pub use export::*;
pub use ingest::*;
pub use run_file::*;
