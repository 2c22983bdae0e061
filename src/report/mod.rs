//! Reporting utilities: terminal tables for fits, failures and coverage.

pub mod format;

pub use format::*;
