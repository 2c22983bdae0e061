//! Alternative-base control.
//!
//! If φ is not special, other irrational bases should place the same values
//! just as close to integer powers. For each base `b` and value `v` the
//! deviation is `|log_b(v) - round(log_b(v))| ∈ [0, 0.5]`; a value resonates
//! with `b` when that deviation is below the threshold.

use std::f64::consts::{E, PI, SQRT_2};

use serde::Serialize;

use crate::error::AppError;
use crate::math::PHI;

/// Default resonance threshold on the integer-power deviation.
pub const DEFAULT_BASE_THRESHOLD: f64 = 0.15;

/// Bases compared against φ, in report order.
pub const STANDARD_BASES: [(&str, f64); 8] = [
    ("φ", PHI),
    ("√2", SQRT_2),
    ("√3", 1.732_050_807_568_877_2),
    ("e", E),
    ("π", PI),
    ("silver", 1.0 + SQRT_2),
    ("2", 2.0),
    ("√5", 2.236_067_977_499_79),
];

/// How well one base places a set of values near integer powers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseComparison {
    pub name: String,
    pub base: f64,
    pub resonant: usize,
    pub total: usize,
    pub resonance_rate: f64,
    pub mean_deviation: f64,
}

/// Compare `bases` on the positive entries of `values`.
pub fn compare_bases(
    values: &[f64],
    bases: &[(&str, f64)],
    threshold: f64,
) -> Result<Vec<BaseComparison>, AppError> {
    if !(threshold.is_finite() && threshold > 0.0 && threshold <= 0.5) {
        return Err(AppError::new(
            2,
            format!("Base threshold must be in (0, 0.5], got {threshold}."),
        ));
    }
    let values: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if values.is_empty() {
        return Err(AppError::new(3, "No positive values to compare bases on."));
    }

    bases
        .iter()
        .map(|&(name, base)| {
            if !(base.is_finite() && base > 0.0 && base != 1.0) {
                return Err(AppError::new(2, format!("Invalid base {name} = {base}.")));
            }
            let ln_base = base.ln();
            let deviations: Vec<f64> = values
                .iter()
                .map(|v| {
                    let power = v.ln() / ln_base;
                    (power - power.round()).abs()
                })
                .collect();
            let resonant = deviations.iter().filter(|&&d| d < threshold).count();
            let total = deviations.len();
            Ok(BaseComparison {
                name: name.to_string(),
                base,
                resonant,
                total,
                resonance_rate: resonant as f64 / total as f64,
                mean_deviation: deviations.iter().sum::<f64>() / total as f64,
            })
        })
        .collect()
}
