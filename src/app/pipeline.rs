//! Shared pipeline logic behind the `fit`, `check` and `coverage` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load constants -> evaluate each (parallel) -> split successes and failures
//!
//! The commands can then focus on presentation.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::builtin_constants;
use crate::coverage::{
    BaseComparison, CoverageEstimate, STANDARD_BASES, Significance, compare_bases, estimate_coverage,
    significance,
};
use crate::domain::{
    Constant, CoverageConfig, DoubleFitResult, Evaluation, Failure, FitConfig, FitOptions, FitResult,
    InputSource, SelectionPolicy,
};
use crate::error::AppError;
use crate::fit::double::best_double_fit_with;
use crate::fit::selection::{evaluate, validate_settings};
use crate::fit::single::best_single_fit_with;
use crate::io::ingest::load_constants;

/// All computed outputs of a single batch run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Human-readable description of where the constants came from.
    pub source: String,
    pub rows_read: usize,
    pub evaluations: Vec<Evaluation>,
    /// Ingest row errors first, then per-constant evaluation failures.
    pub failures: Vec<Failure>,
}

impl RunOutput {
    pub fn on_lattice_count(&self) -> usize {
        self.evaluations.iter().filter(|e| e.on_lattice).count()
    }
}

/// Load the configured constants and evaluate them.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    validate_settings(config.max_m, &config.options, &config.policy)?;

    let (source, constants, mut failures, rows_read) = match &config.input {
        InputSource::File(path) => {
            let ingest = load_constants(path)?;
            let failures: Vec<Failure> = ingest.row_errors.into_iter().map(Failure::from).collect();
            (ingest.source, ingest.constants, failures, ingest.rows_read)
        }
        InputSource::Builtin(set) => {
            let constants = builtin_constants(*set);
            let n = constants.len();
            (format!("builtin:{set:?}").to_lowercase(), constants, Vec::new(), n)
        }
    };

    let (evaluations, eval_failures) =
        evaluate_all(&constants, config.max_m, &config.options, &config.policy);
    failures.extend(eval_failures);

    info!(
        source = %source,
        evaluated = evaluations.len(),
        failed = failures.len(),
        "batch complete"
    );

    if evaluations.is_empty() {
        let detail = failures
            .first()
            .map(|f| format!(" First failure: {}", f.message))
            .unwrap_or_default();
        return Err(AppError::new(3, format!("No constant could be evaluated.{detail}")));
    }

    Ok(RunOutput {
        source,
        rows_read,
        evaluations,
        failures,
    })
}

/// Both fits for one value, as shown by `check`.
#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub value: f64,
    pub single: FitResult,
    /// `None` when `max_m < 2` leaves no correction pair to try.
    pub double: Option<DoubleFitResult>,
}

/// Fit a single value with both correction forms.
pub fn run_check(
    value: f64,
    max_m: u32,
    options: &FitOptions,
    policy: &SelectionPolicy,
) -> Result<CheckOutput, AppError> {
    validate_settings(max_m, options, policy)?;
    let single = best_single_fit_with(value, max_m, options)?;
    let double = if max_m >= 2 {
        Some(best_double_fit_with(value, max_m, options)?)
    } else {
        debug!(max_m, "double correction skipped");
        None
    };
    Ok(CheckOutput {
        value,
        single,
        double,
    })
}

/// A batch judged against the random baseline and against other bases.
#[derive(Debug, Clone)]
pub struct CoverageOutput {
    pub run: RunOutput,
    pub estimate: CoverageEstimate,
    pub significance: Significance,
    pub bases: Vec<BaseComparison>,
    pub base_threshold: f64,
}

/// Evaluate the batch and compare its on-lattice rate with random values.
///
/// The batch and the random samples are judged by the same `evaluate` call;
/// `max_error` is dropped for both so rejected constants are not lost from the count.
pub fn run_coverage(
    config: &FitConfig,
    coverage: &CoverageConfig,
    base_threshold: f64,
) -> Result<CoverageOutput, AppError> {
    let config = FitConfig {
        policy: SelectionPolicy {
            max_error: None,
            ..config.policy
        },
        ..config.clone()
    };
    let run = run_fit(&config)?;
    let estimate = estimate_coverage(coverage, config.max_m, &config.options, &config.policy)?;
    let significance = significance(run.on_lattice_count(), run.evaluations.len(), estimate.rate);

    let values: Vec<f64> = run.evaluations.iter().map(|e| e.constant.value).collect();
    let bases = compare_bases(&values, &STANDARD_BASES, base_threshold)?;

    info!(
        observed = significance.observed,
        total = significance.total,
        random_rate = estimate.rate,
        p_value = significance.p_value,
        "coverage compared"
    );
    Ok(CoverageOutput {
        run,
        estimate,
        significance,
        bases,
        base_threshold,
    })
}

/// Evaluate constants independently, preserving input order.
pub fn evaluate_all(
    constants: &[Constant],
    max_m: u32,
    opts: &FitOptions,
    policy: &SelectionPolicy,
) -> (Vec<Evaluation>, Vec<Failure>) {
    let results: Vec<Result<Evaluation, Failure>> = constants
        .par_iter()
        .map(|c| {
            evaluate(c, max_m, opts, policy).map_err(|e| Failure {
                line: None,
                name: Some(c.name.clone()),
                message: e.to_string(),
            })
        })
        .collect();

    let mut evaluations = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(e) => evaluations.push(e),
            Err(f) => failures.push(f),
        }
    }
    (evaluations, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuiltinSet;

    fn builtin_config(set: BuiltinSet) -> FitConfig {
        FitConfig {
            input: InputSource::Builtin(set),
            max_m: 10,
            options: FitOptions::default(),
            policy: SelectionPolicy::default(),
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn failures_are_reported_alongside_successes() {
        let constants = vec![
            Constant::new("good", 137.036),
            Constant::new("zero", 0.0),
            Constant::new("also good", 0.2245),
        ];
        let (evals, failures) =
            evaluate_all(&constants, 10, &FitOptions::default(), &SelectionPolicy::default());
        assert_eq!(evals.len(), 2);
        assert_eq!(evals[0].constant.name, "good");
        assert_eq!(evals[1].constant.name, "also good");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name.as_deref(), Some("zero"));
        assert!(failures[0].message.starts_with("Invalid input"));
    }

    #[test]
    fn builtin_run_evaluates_every_constant() {
        let run = run_fit(&builtin_config(BuiltinSet::Ratios)).unwrap();
        assert_eq!(run.evaluations.len(), 4);
        assert!(run.failures.is_empty());
        assert_eq!(run.source, "builtin:ratios");
    }

    #[test]
    fn check_reports_both_forms() {
        let out = run_check(1836.152_673_43, 10, &FitOptions::default(), &SelectionPolicy::default())
            .unwrap();
        assert_eq!(out.single.n, 16);
        assert_eq!(out.single.m, Some(2));
        let double = out.double.unwrap();
        assert!(double.first.m < double.second.m);

        let shallow = run_check(42.0, 1, &FitOptions::default(), &SelectionPolicy::default()).unwrap();
        assert!(shallow.double.is_none());
    }

    #[test]
    fn check_rejects_non_positive_values() {
        let err = run_check(-5.0, 10, &FitOptions::default(), &SelectionPolicy::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn coverage_compares_batch_with_baseline_and_bases() {
        let mut config = builtin_config(BuiltinSet::All);
        config.policy.max_error = Some(1e-9);
        let coverage = CoverageConfig {
            trials: 500,
            log10_min: -6.0,
            log10_max: 6.0,
            seed: 42,
        };
        let out = run_coverage(&config, &coverage, 0.15).unwrap();
        // The tight max_error would reject most constants in `fit`; coverage keeps them all.
        assert_eq!(out.run.evaluations.len(), 25);
        assert_eq!(out.significance.total, 25);
        assert_eq!(out.significance.observed, out.run.on_lattice_count());
        assert_eq!(out.estimate.trials, 500);
        assert_eq!(out.bases.len(), STANDARD_BASES.len());
        assert_eq!(out.bases[0].total, 25);
    }

    #[test]
    fn invalid_settings_abort_the_run() {
        let mut config = builtin_config(BuiltinSet::All);
        config.max_m = 0;
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
