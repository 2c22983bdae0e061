//! Export per-constant results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Evaluation, FitForm};
use crate::error::AppError;

const HEADER: [&str; 17] = [
    "name",
    "value",
    "uncertainty",
    "form",
    "n",
    "m",
    "sign",
    "c",
    "raw_c",
    "m2",
    "sign2",
    "approx",
    "relative_error",
    "error_pct",
    "sigma",
    "on_lattice",
    "formula",
];

/// Write per-constant results to a CSV file.
pub fn write_results_csv(path: &Path, evaluations: &[Evaluation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, evaluations)
}

/// Write per-constant results as CSV to any writer.
pub fn write_results<W: Write>(writer: W, evaluations: &[Evaluation]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for e in evaluations {
        let s = &e.single;
        let (m, sign, c, m2, sign2) = match (&e.form, &e.double) {
            (FitForm::Double, Some(d)) => (
                d.first.m.to_string(),
                d.first.sign.symbol().to_string(),
                "1".to_string(),
                d.second.m.to_string(),
                d.second.sign.symbol().to_string(),
            ),
            _ => (
                s.m.map(|m| m.to_string()).unwrap_or_default(),
                if s.m.is_some() { s.sign.symbol().to_string() } else { String::new() },
                format!("{}", s.coefficient),
                String::new(),
                String::new(),
            ),
        };

        out.write_record([
            e.constant.name.clone(),
            format!("{}", e.constant.value),
            e.constant.uncertainty.map(|u| format!("{u}")).unwrap_or_default(),
            e.form.label().to_string(),
            e.n().to_string(),
            m,
            sign,
            c,
            format!("{:.10}", s.raw_coefficient),
            m2,
            sign2,
            format!("{:.12e}", e.approx()),
            format!("{:.10e}", e.relative_error()),
            format!("{:.6}", e.relative_error() * 100.0),
            e.sigma.map(|v| format!("{v:.6e}")).unwrap_or_default(),
            e.on_lattice.to_string(),
            e.formula(),
        ])
        .map_err(|err| AppError::new(2, format!("Failed to write export CSV row: {err}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
