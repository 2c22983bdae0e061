//! Lattice fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the candidate correction grids (`±φ^(-m)` and pairs of them)
//! - find the best single and double corrections for a value
//! - select the reported form per constant using the coefficient tolerance

pub mod depth_grid;
pub mod double;
pub mod selection;
pub mod single;

pub use depth_grid::*;
pub use double::*;
pub use selection::*;
pub use single::*;
