//! Error types.
//!
//! - `FitError` is the taxonomy of the numeric core (per-constant failures).
//! - `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - `2`: usage, configuration or I/O problems
//! - `3`: no usable data (nothing to fit, or every constant failed)
//! - `4`: internal computation failure

use thiserror::Error;

/// Failure of a single evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// The input cannot be placed on the φ-lattice (non-positive value, bad search depth, malformed row).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search space is too small for the requested form or error tolerance.
    #[error("No fit found: {0}")]
    NoFitFound(String),
}

pub type PhiResult<T> = Result<T, FitError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::InvalidInput(_) => AppError::new(2, err.to_string()),
            FitError::NoFitFound(_) => AppError::new(3, err.to_string()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
