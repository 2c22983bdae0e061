//! Command-line parsing for the φ-lattice fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code. Every search knob can also be set through a
//! `PHIFIT_*` environment variable (a `.env` file is loaded first).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{BuiltinSet, TieBreak};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "phifit", version, about = "Nested golden-ratio (φ-lattice) fits for physical ratios")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `PHIFIT_LOG` takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a table of constants, print the results, and optionally export them.
    Fit(FitArgs),
    /// Fit a single value and show both the single and double corrections.
    Check(CheckArgs),
    /// Compare on-lattice counts against a random-value baseline.
    Coverage(CoverageArgs),
    /// Re-print a run previously exported with `fit --export-json`.
    Show(ShowArgs),
}

/// Where constants come from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV/text file with `name,value[,uncertainty]` rows.
    #[arg(short = 'i', long, value_name = "FILE", conflicts_with = "builtin")]
    pub input: Option<PathBuf>,

    /// Built-in constant group (used when no input file is given).
    #[arg(long, value_enum, default_value_t = BuiltinSet::All)]
    pub builtin: BuiltinSet,
}

/// Lattice search and selection knobs.
#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// Deepest correction depth `m` to search.
    #[arg(long, env = "PHIFIT_MAX_M", default_value_t = 10)]
    pub max_m: u32,

    /// Accepted band for `|c - 1|` before a double correction is tried.
    #[arg(long, env = "PHIFIT_TOLERANCE", default_value_t = 0.3)]
    pub tolerance: f64,

    /// A double correction must leave less than this fraction of the
    /// unit-coefficient residual to be reported.
    #[arg(long, env = "PHIFIT_DOUBLE_GAIN", default_value_t = 0.5)]
    pub double_gain: f64,

    /// Rounding step for the reported coefficient (0 keeps the raw value).
    #[arg(long, env = "PHIFIT_COEFFICIENT_STEP", default_value_t = 0.01)]
    pub coefficient_step: f64,

    /// Remainders `|δ|` at or below this count as exact powers of φ.
    #[arg(long, env = "PHIFIT_EXACT_TOLERANCE", default_value_t = 1e-12)]
    pub exact_tolerance: f64,

    /// Which depth wins when two candidates fit equally well.
    #[arg(long, value_enum, env = "PHIFIT_TIE_BREAK", default_value_t = TieBreak::Shallow)]
    pub tie_break: TieBreak,

    /// Fail constants whose chosen fit misses by more than this many percent.
    #[arg(long, env = "PHIFIT_MAX_ERROR", value_name = "PERCENT")]
    pub max_error: Option<f64>,
}

/// Options for `fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Export per-constant results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the whole run (settings + evaluations + failures) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `check`.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Observed value (must be > 0).
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Options for `coverage`.
#[derive(Debug, Args, Clone)]
pub struct CoverageArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Number of random values to draw.
    #[arg(long, env = "PHIFIT_TRIALS", default_value_t = 10_000)]
    pub trials: usize,

    /// Random seed (the baseline is reproducible for a given seed).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Lower bound of `log10(value)` for random draws.
    #[arg(long, default_value_t = -6.0, allow_negative_numbers = true)]
    pub log10_min: f64,

    /// Upper bound of `log10(value)` for random draws.
    #[arg(long, default_value_t = 6.0, allow_negative_numbers = true)]
    pub log10_max: f64,

    /// A value resonates with a base when `log_b(value)` is within this of an integer.
    #[arg(long, default_value_t = crate::coverage::DEFAULT_BASE_THRESHOLD)]
    pub base_threshold: f64,
}

/// Options for `show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Run JSON produced by `phifit fit --export-json`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fit_with_builtin_group() {
        let cli = Cli::parse_from(["phifit", "fit", "--builtin", "ratios", "--max-m", "6"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.builtin, BuiltinSet::Ratios);
        assert!(args.input.input.is_none());
        assert_eq!(args.search.max_m, 6);
    }

    #[test]
    fn check_accepts_negative_values_for_validation_later() {
        let cli = Cli::parse_from(["phifit", "check", "-5"]);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.value, -5.0);
    }

    #[test]
    fn coverage_defaults() {
        let cli = Cli::parse_from(["phifit", "coverage", "--log10-min", "-3"]);
        let Command::Coverage(args) = cli.command else {
            panic!("expected coverage");
        };
        assert_eq!(args.log10_min, -3.0);
        assert_eq!(args.trials, 10_000);
        assert_eq!(args.base_threshold, 0.15);
    }

    #[test]
    fn input_file_conflicts_with_builtin() {
        let res = Cli::try_parse_from(["phifit", "fit", "-i", "a.csv", "--builtin", "ckm"]);
        assert!(res.is_err());
    }
}
