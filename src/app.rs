//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the batch, single-value, or coverage workflow
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{CheckArgs, Command, CoverageArgs, FitArgs, InputArgs, SearchArgs, ShowArgs};
use crate::domain::{CoverageConfig, FitConfig, FitOptions, InputSource, SelectionPolicy};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `phifit` binary.
pub fn run() -> Result<(), AppError> {
    // Environment fallbacks (PHIFIT_*) may live in a local .env file.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Check(args) => handle_check(args),
        Command::Coverage(args) => handle_coverage(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;
    let run_file = crate::io::run_file::build_run_file(&run, &config);

    println!("{}", crate::report::format_run_summary(&run_file));
    print!("{}", crate::report::format_evaluations(&run.evaluations));
    print!("{}", crate::report::format_failures(&run.failures));

    if let Some(path) = &config.export_csv {
        crate::io::export::write_results_csv(path, &run.evaluations)?;
        info!(path = %path.display(), "results CSV written");
    }
    if let Some(path) = &config.export_json {
        crate::io::run_file::write_run_json(path, &run_file)?;
        info!(path = %path.display(), "run JSON written");
    }

    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let (max_m, options, policy) = search_settings(&args.search);
    let out = pipeline::run_check(args.value, max_m, &options, &policy)?;

    print!("{}", crate::report::format_check(out.value, &out.single, out.double.as_ref()));
    Ok(())
}

fn handle_coverage(args: CoverageArgs) -> Result<(), AppError> {
    let (max_m, options, policy) = search_settings(&args.search);
    let config = FitConfig {
        input: input_source(&args.input),
        max_m,
        options,
        policy,
        export_csv: None,
        export_json: None,
    };
    let coverage = CoverageConfig {
        trials: args.trials,
        log10_min: args.log10_min,
        log10_max: args.log10_max,
        seed: args.seed,
    };

    let out = pipeline::run_coverage(&config, &coverage, args.base_threshold)?;

    print!(
        "{}",
        crate::report::format_coverage(&out.estimate, &out.significance, policy.tolerance, &coverage)
    );
    print!("{}", crate::report::format_base_comparison(&out.bases, out.base_threshold));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let run = crate::io::run_file::read_run_json(&args.run)?;

    println!("{}", crate::report::format_run_summary(&run));
    print!("{}", crate::report::format_evaluations(&run.evaluations));
    print!("{}", crate::report::format_failures(&run.failures));
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let (max_m, options, policy) = search_settings(&args.search);
    FitConfig {
        input: input_source(&args.input),
        max_m,
        options,
        policy,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

fn search_settings(args: &SearchArgs) -> (u32, FitOptions, SelectionPolicy) {
    let options = FitOptions {
        coefficient_step: args.coefficient_step,
        exact_tolerance: args.exact_tolerance,
        tie_break: args.tie_break,
    };
    let policy = SelectionPolicy {
        tolerance: args.tolerance,
        double_gain: args.double_gain,
        // CLI takes percent; the policy stores a fraction.
        max_error: args.max_error.map(|pct| pct / 100.0),
    };
    (args.max_m, options, policy)
}

fn input_source(args: &InputArgs) -> InputSource {
    match &args.input {
        Some(path) => InputSource::File(path.clone()),
        None => InputSource::Builtin(args.builtin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{BuiltinSet, TieBreak};
    use std::path::PathBuf;

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["phifit", "fit"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Fit(args) => args,
            other => panic!("expected fit, got {other:?}"),
        }
    }

    #[test]
    fn defaults_match_the_library_defaults() {
        let config = fit_config_from_args(&fit_args(&[]));
        assert_eq!(config.input, InputSource::Builtin(BuiltinSet::All));
        assert_eq!(config.max_m, 10);
        assert_eq!(config.options, FitOptions::default());
        assert_eq!(config.policy, SelectionPolicy::default());
        assert!(config.export_csv.is_none());
    }

    #[test]
    fn flags_flow_into_the_config() {
        let config = fit_config_from_args(&fit_args(&[
            "-i",
            "ratios.csv",
            "--max-m",
            "6",
            "--tie-break",
            "deep",
            "--max-error",
            "0.5",
            "--export",
            "out.csv",
        ]));
        assert_eq!(config.input, InputSource::File(PathBuf::from("ratios.csv")));
        assert_eq!(config.max_m, 6);
        assert_eq!(config.options.tie_break, TieBreak::Deep);
        assert_eq!(config.policy.max_error, Some(0.005));
        assert_eq!(config.export_csv, Some(PathBuf::from("out.csv")));
    }
}
