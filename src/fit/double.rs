//! Best double-correction fit.
//!
//! Explains the remainder `δ = log_φ(v) - n` with two unit terms:
//!
//! `δ ≈ s1×φ^(-m1) + s2×φ^(-m2)`, `1 <= m1 < m2 <= max_m`
//!
//! and keeps the pair with the smallest exponent residual. Coefficients are
//! fixed at 1, so there is nothing to round and `approx` is exact lattice
//! arithmetic.

use tracing::trace;

use crate::domain::{Correction, DoubleFitResult, FitOptions, TieBreak};
use crate::error::{FitError, PhiResult};
use crate::fit::depth_grid::pair_grid;
use crate::fit::single::validate_value;
use crate::math::{phi_pow, relative_error, split_exponent};

/// `bestDoubleFit(v, maxM)` with default options.
pub fn best_double_fit(value: f64, max_m: u32) -> PhiResult<DoubleFitResult> {
    best_double_fit_with(value, max_m, &FitOptions::default())
}

/// Find the correction pair minimizing `|δ - (s1 φ^(-m1) + s2 φ^(-m2))|`.
pub fn best_double_fit_with(
    value: f64,
    max_m: u32,
    opts: &FitOptions,
) -> PhiResult<DoubleFitResult> {
    validate_value(value)?;
    let grid = pair_grid(max_m)?;
    let (n, delta) = split_exponent(value);

    let mut best: Option<((Correction, Correction), f64)> = None;
    for pair in grid {
        let residual = (delta - (pair.0.term() + pair.1.term())).abs();
        let replace = match best {
            None => true,
            Some((incumbent, r_best)) => {
                residual < r_best
                    || (residual == r_best && wins_pair_tie(opts.tie_break, pair, incumbent))
            }
        };
        if replace {
            best = Some((pair, residual));
        }
    }

    let Some(((first, second), residual)) = best else {
        return Err(FitError::NoFitFound(format!(
            "no correction pair for value {value} within max_m={max_m}"
        )));
    };

    let mut fit = DoubleFitResult {
        n,
        first,
        second,
        approx: 0.0,
        residual,
        relative_error: 0.0,
    };
    fit.approx = phi_pow(fit.exponent());
    fit.relative_error = relative_error(fit.approx, value);
    trace!(value, n, m1 = first.m, m2 = second.m, residual, "double fit");
    Ok(fit)
}

fn wins_pair_tie(
    tie_break: TieBreak,
    pair: (Correction, Correction),
    incumbent: (Correction, Correction),
) -> bool {
    let depth = (pair.0.m, pair.1.m);
    let incumbent_depth = (incumbent.0.m, incumbent.1.m);
    match tie_break {
        TieBreak::Shallow => depth < incumbent_depth,
        TieBreak::Deep => depth > incumbent_depth,
    }
}
