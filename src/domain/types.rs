//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for printing or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::math::phi_pow;

/// Sign of a correction term in the exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// Both signs, in search order.
    pub const BOTH: [Sign; 2] = [Sign::Minus, Sign::Plus];

    pub fn value(self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// How to break exact ties between candidate correction depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Prefer the smaller depth `m` (the first candidate found).
    Shallow,
    /// Prefer the larger depth `m`.
    Deep,
}

/// Which correction form was reported for a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitForm {
    Single,
    Double,
}

impl FitForm {
    pub fn label(self) -> &'static str {
        match self {
            FitForm::Single => "single",
            FitForm::Double => "double",
        }
    }
}

/// Category of a catalog constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstantGroup {
    /// Particle mass divided by the electron mass.
    Mass,
    Coupling,
    Ckm,
    /// High-precision ratios with known experimental uncertainty.
    Ratio,
}

/// Selector for the built-in constant catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinSet {
    All,
    Masses,
    Couplings,
    Ckm,
    Ratios,
}

impl BuiltinSet {
    pub fn includes(self, group: ConstantGroup) -> bool {
        match self {
            BuiltinSet::All => true,
            BuiltinSet::Masses => group == ConstantGroup::Mass,
            BuiltinSet::Couplings => group == ConstantGroup::Coupling,
            BuiltinSet::Ckm => group == ConstantGroup::Ckm,
            BuiltinSet::Ratios => group == ConstantGroup::Ratio,
        }
    }
}

/// A named observed ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: f64,
    /// Absolute experimental uncertainty, same unit as `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ConstantGroup>,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            uncertainty: None,
            group: None,
        }
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = Some(uncertainty);
        self
    }

    pub fn in_group(mut self, group: ConstantGroup) -> Self {
        self.group = Some(group);
        self
    }
}

/// One `±φ^(-m)` term of an exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub m: u32,
    pub sign: Sign,
}

impl Correction {
    /// Signed term `s × φ^(-m)`.
    pub fn term(self) -> f64 {
        self.sign.value() * phi_pow(-f64::from(self.m))
    }
}

/// Best single-correction fit `φ^(n + s×c×φ^(-m))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub n: i32,
    /// `None` when the value already sits on `φ^n` and needs no correction.
    pub m: Option<u32>,
    pub sign: Sign,
    /// Reported coefficient; `approx` is computed from this value.
    pub coefficient: f64,
    /// Coefficient before rounding to the reporting step.
    pub raw_coefficient: f64,
    pub approx: f64,
    pub relative_error: f64,
}

impl FitResult {
    /// The fitted exponent `n + s×c×φ^(-m)`.
    pub fn exponent(&self) -> f64 {
        match self.m {
            Some(m) => {
                f64::from(self.n) + self.sign.value() * self.coefficient * phi_pow(-f64::from(m))
            }
            None => f64::from(self.n),
        }
    }

    /// `|c - 1|` measured on the raw coefficient.
    pub fn coefficient_deviation(&self) -> f64 {
        (self.raw_coefficient - 1.0).abs()
    }

    /// Exponent residual of the unit-coefficient lattice point `φ^(n ± φ^(-m))`.
    ///
    /// Since `δ = s×c_raw×φ^(-m)`, this is `φ^(-m) × |c_raw - 1|`.
    pub fn unit_residual(&self) -> f64 {
        match self.m {
            Some(m) => phi_pow(-f64::from(m)) * self.coefficient_deviation(),
            None => 0.0,
        }
    }

    /// The coefficient as printed: two decimals, or scientific when that would read `0.00`.
    pub fn coefficient_label(&self) -> String {
        match self.m {
            None => "0".to_string(),
            Some(_) if self.coefficient.abs() < 0.005 => format!("{:.3e}", self.coefficient),
            Some(_) => format!("{:.2}", self.coefficient),
        }
    }

    pub fn formula(&self) -> String {
        match self.m {
            Some(m) => format!(
                "φ^({} {} {}×φ^(-{m}))",
                self.n,
                self.sign.symbol(),
                self.coefficient_label()
            ),
            None => format!("φ^({})", self.n),
        }
    }
}

/// Best double-correction fit `φ^(n + s1×φ^(-m1) + s2×φ^(-m2))`, `m1 < m2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleFitResult {
    pub n: i32,
    pub first: Correction,
    pub second: Correction,
    pub approx: f64,
    /// Residual left in the exponent after both corrections.
    pub residual: f64,
    pub relative_error: f64,
}

impl DoubleFitResult {
    pub fn exponent(&self) -> f64 {
        f64::from(self.n) + self.first.term() + self.second.term()
    }

    pub fn formula(&self) -> String {
        format!(
            "φ^({} {} φ^(-{}) {} φ^(-{}))",
            self.n,
            self.first.sign.symbol(),
            self.first.m,
            self.second.sign.symbol(),
            self.second.m
        )
    }
}

/// Everything computed for one constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub constant: Constant,
    pub single: FitResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double: Option<DoubleFitResult>,
    pub form: FitForm,
    /// Single fit with `|c-1|` within tolerance, or a chosen double correction.
    pub on_lattice: bool,
    /// `|approx - value| / uncertainty` when an uncertainty is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
}

impl Evaluation {
    pub fn n(&self) -> i32 {
        match (&self.form, &self.double) {
            (FitForm::Double, Some(d)) => d.n,
            _ => self.single.n,
        }
    }

    pub fn approx(&self) -> f64 {
        match (&self.form, &self.double) {
            (FitForm::Double, Some(d)) => d.approx,
            _ => self.single.approx,
        }
    }

    pub fn relative_error(&self) -> f64 {
        match (&self.form, &self.double) {
            (FitForm::Double, Some(d)) => d.relative_error,
            _ => self.single.relative_error,
        }
    }

    pub fn formula(&self) -> String {
        match (&self.form, &self.double) {
            (FitForm::Double, Some(d)) => d.formula(),
            _ => self.single.formula(),
        }
    }
}

/// Knobs of the lattice search itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Rounding step for the reported coefficient (`0` keeps the raw value).
    pub coefficient_step: f64,
    /// `|δ|` at or below this is treated as an exact power of φ.
    pub exact_tolerance: f64,
    pub tie_break: TieBreak,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            coefficient_step: 0.01,
            exact_tolerance: 1e-12,
            tie_break: TieBreak::Shallow,
        }
    }
}

/// Rules for choosing between the single and the double correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Half-width of the open `|c-1|` band accepted for a single correction.
    pub tolerance: f64,
    /// The double fit must leave less than `double_gain ×` the unit-coefficient residual.
    pub double_gain: f64,
    /// Reject the constant when the chosen fit's relative error exceeds this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_error: Option<f64>,
}

impl SelectionPolicy {
    /// Whether a single coefficient lies in the open band `1 - tolerance < c < 1 + tolerance`.
    pub fn accepts(&self, fit: &FitResult) -> bool {
        fit.m.is_none() || fit.coefficient_deviation() < self.tolerance
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            tolerance: 0.3,
            double_gain: 0.5,
            max_error: None,
        }
    }
}

/// Where the constants of a run come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(PathBuf),
    Builtin(BuiltinSet),
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: InputSource,
    /// Deepest correction `m` searched.
    pub max_m: u32,
    pub options: FitOptions,
    pub policy: SelectionPolicy,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Monte Carlo settings for the lattice coverage baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageConfig {
    pub trials: usize,
    pub log10_min: f64,
    pub log10_max: f64,
    pub seed: u64,
}

/// A constant that could not be evaluated (or a row that could not be read).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Input line, for rows that failed during ingest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

/// A saved run (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub max_m: u32,
    pub options: FitOptions,
    pub policy: SelectionPolicy,
    pub evaluations: Vec<Evaluation>,
    pub failures: Vec<Failure>,
}
