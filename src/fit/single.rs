//! Best single-correction fit.
//!
//! Given a value `v > 0` with `log_φ(v) = n + δ`, every grid candidate
//! `(m, s)` implies a coefficient
//!
//! `c = δ / (s × φ^(-m))`
//!
//! and we keep the candidate whose `c` is closest to 1. Candidates with
//! `c <= 0` are dropped: for `δ != 0` exactly one sign produces a positive
//! coefficient, so the search never comes back empty.

use tracing::trace;

use crate::domain::{Correction, FitOptions, FitResult, Sign, TieBreak};
use crate::error::{FitError, PhiResult};
use crate::fit::depth_grid::single_grid;
use crate::math::{phi_pow, quantize, relative_error, split_exponent};

/// `bestSingleFit(v, maxM)` with default options.
pub fn best_single_fit(value: f64, max_m: u32) -> PhiResult<FitResult> {
    best_single_fit_with(value, max_m, &FitOptions::default())
}

/// Find the `(n, m, s, c)` tuple with `c` closest to 1.
pub fn best_single_fit_with(value: f64, max_m: u32, opts: &FitOptions) -> PhiResult<FitResult> {
    validate_value(value)?;
    let grid = single_grid(max_m)?;

    let (n, delta) = split_exponent(value);
    if delta.abs() <= opts.exact_tolerance {
        return Ok(finish(value, n, None, Sign::Plus, 0.0, 0.0));
    }

    let mut best: Option<(Correction, f64)> = None;
    for corr in grid {
        let c = delta / corr.term();
        if !(c.is_finite() && c > 0.0) {
            continue;
        }
        let dev = (c - 1.0).abs();
        let replace = match best {
            None => true,
            Some((incumbent, c_best)) => {
                let dev_best = (c_best - 1.0).abs();
                dev < dev_best || (dev == dev_best && wins_tie(opts.tie_break, corr.m, incumbent.m))
            }
        };
        if replace {
            best = Some((corr, c));
        }
    }

    let Some((corr, raw)) = best else {
        return Err(FitError::NoFitFound(format!(
            "no positive coefficient for value {value} within max_m={max_m}"
        )));
    };

    // `c = 0` is reserved for exact powers; keep the raw value when rounding would hit it.
    let coefficient = match quantize(raw, opts.coefficient_step) {
        c if c > 0.0 => c,
        _ => raw,
    };
    trace!(value, n, m = corr.m, c = raw, "single fit");
    Ok(finish(value, n, Some(corr.m), corr.sign, coefficient, raw))
}

/// Whether a candidate at depth `m` beats an equally good incumbent at `incumbent_m`.
pub(crate) fn wins_tie(tie_break: TieBreak, m: u32, incumbent_m: u32) -> bool {
    match tie_break {
        TieBreak::Shallow => m < incumbent_m,
        TieBreak::Deep => m > incumbent_m,
    }
}

pub(crate) fn validate_value(value: f64) -> PhiResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(FitError::InvalidInput(format!(
            "value must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn finish(
    value: f64,
    n: i32,
    m: Option<u32>,
    sign: Sign,
    coefficient: f64,
    raw_coefficient: f64,
) -> FitResult {
    let mut fit = FitResult {
        n,
        m,
        sign,
        coefficient,
        raw_coefficient,
        approx: 0.0,
        relative_error: 0.0,
    };
    // Reconstruct from the reported fields so `approx` always round-trips.
    fit.approx = phi_pow(fit.exponent());
    fit.relative_error = relative_error(fit.approx, value);
    fit
}
