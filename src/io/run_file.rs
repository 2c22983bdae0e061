//! Read/write run JSON files.
//!
//! A run JSON is the "portable" representation of a batch:
//! - search settings (max depth, coefficient step, tie-break, policy)
//! - every evaluation (both fits, chosen form, σ)
//! - failures from ingest and evaluation
//!
//! The schema is defined by `domain::RunFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::RunOutput;
use crate::domain::{FitConfig, RunFile};
use crate::error::AppError;

/// Tool name stamped into run files.
pub const TOOL_NAME: &str = "phifit";

/// Snapshot a finished run into its serializable form.
pub fn build_run_file(run: &RunOutput, config: &FitConfig) -> RunFile {
    RunFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        source: run.source.clone(),
        max_m: config.max_m,
        options: config.options,
        policy: config.policy,
        evaluations: run.evaluations.clone(),
        failures: run.failures.clone(),
    }
}

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, run)
        .map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;
    Ok(())
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: RunFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid run JSON: {e}")))?;
    if run.tool != TOOL_NAME {
        return Err(AppError::new(
            2,
            format!("'{}' was written by '{}', not {TOOL_NAME}.", path.display(), run.tool),
        ));
    }
    Ok(run)
}
