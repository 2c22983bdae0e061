//! End-to-end file workflow: ingest CSV -> batch fit -> CSV/JSON export -> reload.

use std::fs;
use std::path::Path;

use phi_fit::app::pipeline::run_fit;
use phi_fit::domain::{FitConfig, FitForm, FitOptions, InputSource, SelectionPolicy};
use phi_fit::io::{build_run_file, load_constants, read_run_json, write_results_csv, write_run_json};

const INPUT: &str = "\
# ratios to test
name,value,uncertainty
mp/me,1836.15267343,0.00000011
1/alpha,137.035999084,
phi5,11.090169943749474
broken,abc
negative,-3.0
";

fn write_input(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("ratios.csv");
    fs::write(&path, INPUT).unwrap();
    path
}

fn config(input: &Path) -> FitConfig {
    FitConfig {
        input: InputSource::File(input.to_path_buf()),
        max_m: 10,
        options: FitOptions::default(),
        policy: SelectionPolicy::default(),
        export_csv: None,
        export_json: None,
    }
}

#[test]
fn ingest_skips_bad_rows_and_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let data = load_constants(&write_input(dir.path())).unwrap();

    let names: Vec<&str> = data.constants.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["mp/me", "1/alpha", "phi5", "negative"]);
    assert_eq!(data.constants[0].uncertainty, Some(0.000_000_11));
    assert_eq!(data.constants[1].uncertainty, None);
    assert_eq!(data.row_errors.len(), 1);
    assert_eq!(data.row_errors[0].name.as_deref(), Some("broken"));
    assert_eq!(data.rows_read, 5);
}

#[test]
fn batch_run_reports_failures_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let run = run_fit(&config(&input)).unwrap();

    assert_eq!(run.evaluations.len(), 3);
    // Ingest error for "broken", evaluation error for "negative".
    assert_eq!(run.failures.len(), 2);
    assert!(run.failures.iter().any(|f| f.name.as_deref() == Some("negative")));

    let proton = &run.evaluations[0];
    assert_eq!(proton.form, FitForm::Single);
    assert_eq!(proton.n(), 16);
    assert_eq!(proton.single.m, Some(2));
    assert!(proton.on_lattice);
    assert!(proton.sigma.is_some());

    let phi5 = &run.evaluations[2];
    assert_eq!(phi5.single.m, None);
    assert_eq!(phi5.n(), 5);

    let csv_path = dir.path().join("results.csv");
    write_results_csv(&csv_path, &run.evaluations).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("name"));
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get(0), Some("mp/me"));
    assert_eq!(rows[1].get(0), Some("1/alpha"));
}

#[test]
fn run_json_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let cfg = config(&input);
    let run = run_fit(&cfg).unwrap();
    let run_file = build_run_file(&run, &cfg);

    let json_path = dir.path().join("run.json");
    write_run_json(&json_path, &run_file).unwrap();
    let loaded = read_run_json(&json_path).unwrap();

    assert_eq!(loaded.tool, "phifit");
    assert_eq!(loaded.source, run_file.source);
    assert_eq!(loaded.max_m, 10);
    assert_eq!(loaded.options, cfg.options);
    assert_eq!(loaded.failures, run_file.failures);
    assert_eq!(loaded.evaluations.len(), run_file.evaluations.len());
    for (a, b) in loaded.evaluations.iter().zip(&run_file.evaluations) {
        assert_eq!(a.constant.name, b.constant.name);
        assert_eq!(a.form, b.form);
        assert_eq!(a.n(), b.n());
        assert!((a.approx() / b.approx() - 1.0).abs() < 1e-14);
    }
}

#[test]
fn run_json_from_another_tool_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let cfg = config(&input);
    let mut run_file = build_run_file(&run_fit(&cfg).unwrap(), &cfg);
    run_file.tool = "something-else".to_string();

    let json_path = dir.path().join("foreign.json");
    write_run_json(&json_path, &run_file).unwrap();
    assert_eq!(read_run_json(&json_path).unwrap_err().exit_code(), 2);
}

#[test]
fn file_with_no_usable_rows_exits_with_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "name,value\n# nothing here\n").unwrap();
    assert_eq!(load_constants(&path).unwrap_err().exit_code(), 3);
    assert_eq!(run_fit(&config(&path)).unwrap_err().exit_code(), 3);
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_fit(&config(&dir.path().join("nope.csv"))).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
