//! CSV ingest and normalization.
//!
//! This module turns a `name,value[,uncertainty]` table into `Constant`s.
//!
//! Design goals:
//! - **Forgiving layout**: optional header row, `#` comments, surrounding whitespace
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior**: constants keep file order
//! - **Separation of concerns**: no fitting logic here; non-positive values are
//!   accepted and rejected later by the evaluator

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Constant, Failure};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub name: Option<String>,
    pub message: String,
}

impl From<RowError> for Failure {
    fn from(err: RowError) -> Self {
        Failure {
            line: Some(err.line),
            name: err.name,
            message: err.message,
        }
    }
}

/// Ingest output: parsed constants + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub source: String,
    pub constants: Vec<Constant>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Column positions, either from a header row or positional defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    value: usize,
    uncertainty: Option<usize>,
}

const POSITIONAL: Columns = Columns {
    name: 0,
    value: 1,
    uncertainty: Some(2),
};

/// Load constants from a CSV/text file.
pub fn load_constants(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    read_constants(file, &path.display().to_string())
}

/// Parse constants from any reader (used by `load_constants` and tests).
pub fn read_constants<R: Read>(reader: R, source: &str) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns: Option<Columns> = None;
    let mut constants = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(idx + 1, |p| p.line() as usize);
                rows_read += 1;
                row_errors.push(RowError {
                    line,
                    name: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        // Comments are skipped here rather than by the csv reader, whose line
        // counter would otherwise not advance over them.
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);

        if record.iter().all(str::is_empty) || is_comment(&record) {
            continue;
        }

        // The first meaningful row decides the layout.
        let cols = match columns {
            Some(cols) => cols,
            None => {
                let header = detect_header(&record);
                columns = Some(header.unwrap_or(POSITIONAL));
                if let Some(cols) = header {
                    debug!(line, ?cols, "detected header row");
                    continue;
                }
                POSITIONAL
            }
        };

        rows_read += 1;
        match parse_row(&record, cols) {
            Ok(constant) => constants.push(constant),
            Err((name, message)) => {
                warn!(line, message = %message, "skipping malformed row");
                row_errors.push(RowError { line, name, message });
            }
        }
    }

    if constants.is_empty() {
        let detail = row_errors
            .first()
            .map(|e| format!(" (line {}: {})", e.line, e.message))
            .unwrap_or_default();
        return Err(AppError::new(
            3,
            format!("No usable constants in '{source}'{detail}."),
        ));
    }

    Ok(IngestedData {
        source: source.to_string(),
        constants,
        row_errors,
        rows_read,
    })
}

/// Treat the row as a header when its value column is not numeric.
fn detect_header(record: &StringRecord) -> Option<Columns> {
    let value_is_numeric = record
        .get(1)
        .is_some_and(|v| v.parse::<f64>().is_ok());
    if value_is_numeric {
        return None;
    }

    let names: Vec<String> = record.iter().map(normalize_header_name).collect();
    let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

    let name = find(&["name", "label", "constant"]).unwrap_or(0);
    let value = find(&["value", "observed", "ratio"]).unwrap_or(1);
    // Without a named uncertainty column, a third field is still the uncertainty.
    let uncertainty = find(&["uncertainty", "sigma", "error", "err"])
        .or_else(|| (0..=2).find(|&i| i != name && i != value));

    Some(Columns {
        name,
        value,
        uncertainty,
    })
}

fn is_comment(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|first| first.trim_start_matches('\u{feff}').starts_with('#'))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, cols: Columns) -> Result<Constant, (Option<String>, String)> {
    let name = record
        .get(cols.name)
        .map(|s| s.trim_start_matches('\u{feff}'))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| (None, "Missing required value: `name`".to_string()))?
        .to_string();

    let raw_value = record
        .get(cols.value)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| (Some(name.clone()), "Missing required value: `value`".to_string()))?;
    let value = raw_value
        .parse::<f64>()
        .map_err(|_| (Some(name.clone()), format!("Invalid value '{raw_value}'.")))?;

    let uncertainty = match cols.uncertainty.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => {
            let u = raw
                .parse::<f64>()
                .map_err(|_| (Some(name.clone()), format!("Invalid uncertainty '{raw}'.")))?;
            if !(u.is_finite() && u >= 0.0) {
                return Err((
                    Some(name),
                    format!("Uncertainty must be finite and >= 0, got '{raw}'."),
                ));
            }
            Some(u)
        }
    };

    Ok(Constant {
        name,
        value,
        uncertainty,
        group: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<IngestedData, AppError> {
        read_constants(text.as_bytes(), "test")
    }

    #[test]
    fn reads_positional_rows() {
        let data = read("mp/me, 1836.15267343, 0.00000011\nalpha_s,0.1179\n").unwrap();
        assert_eq!(data.constants.len(), 2);
        assert_eq!(data.constants[0].name, "mp/me");
        assert_eq!(data.constants[0].uncertainty, Some(0.000_000_11));
        assert_eq!(data.constants[1].uncertainty, None);
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn detects_reordered_header_with_bom() {
        let data = read("\u{feff}Value,Name\n137.036,1/alpha\n").unwrap();
        assert_eq!(data.constants.len(), 1);
        assert_eq!(data.constants[0].name, "1/alpha");
        assert!((data.constants[0].value - 137.036).abs() < 1e-12);
    }

    #[test]
    fn reports_bad_rows_with_line_numbers() {
        let text = "name,value\nok,2.5\nbad,abc\n,3.0\nneg_sigma,4.0,-1\n";
        let data = read(text).unwrap();
        assert_eq!(data.constants.len(), 1);
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.row_errors.len(), 3);
        assert_eq!(data.row_errors[0].line, 3);
        assert_eq!(data.row_errors[0].name.as_deref(), Some("bad"));
        assert_eq!(data.row_errors[1].name, None);
        assert_eq!(data.row_errors[2].name.as_deref(), Some("neg_sigma"));
    }

    #[test]
    fn skips_comment_lines() {
        let data = read("# measured ratios\nname,value\n# muon\nmmu/me,206.768283\n").unwrap();
        assert_eq!(data.constants.len(), 1);
        assert_eq!(data.constants[0].name, "mmu/me");
    }

    #[test]
    fn comment_lines_still_count_towards_line_numbers() {
        let data = read("# c\nname,value\n# c2, with a comma\nbad,abc\nok,1\n").unwrap();
        assert_eq!(data.constants.len(), 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 4);
        assert_eq!(data.row_errors[0].name.as_deref(), Some("bad"));
    }

    #[test]
    fn third_field_is_uncertainty_under_a_two_column_header() {
        let data = read("name,value\nx,4.0,0.1\n").unwrap();
        assert_eq!(data.constants[0].uncertainty, Some(0.1));

        let data = read("value,name\n4.0,x,0.2\n").unwrap();
        assert_eq!(data.constants[0].name, "x");
        assert_eq!(data.constants[0].uncertainty, Some(0.2));
    }

    #[test]
    fn keeps_non_positive_values_for_the_evaluator() {
        let data = read("zero,0\nnegative,-2\n").unwrap();
        assert_eq!(data.constants.len(), 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = read("# nothing here\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
