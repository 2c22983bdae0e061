//! Lattice coverage baseline.
//!
//! Fitting always drives `c` toward 1, so "the fitted coefficient is close to
//! 1" says little on its own. The meaningful comparison is against random
//! numbers: how often is a log-uniform random value on-lattice under the same
//! selection policy that judged the batch?
//!
//! - `estimate_coverage` answers that by seeded Monte Carlo.
//! - `significance` compares a batch's on-lattice count to that rate with a
//!   binomial tail probability.
//! - `compare_bases` checks whether φ does better than other bases at placing
//!   the same values near integer powers.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Constant, CoverageConfig, FitOptions, SelectionPolicy};
use crate::error::AppError;
use crate::fit::selection::{evaluate, validate_settings};

pub mod bases;

pub use bases::*;

/// Monte Carlo estimate of lattice coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageEstimate {
    pub trials: usize,
    pub hits: usize,
    pub rate: f64,
}

/// Observed on-lattice rate versus the random baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Significance {
    pub observed: usize,
    pub total: usize,
    pub observed_rate: f64,
    pub random_rate: f64,
    /// `observed_rate / random_rate`; `None` when the random rate is zero.
    pub enrichment: Option<f64>,
    /// `P(X >= observed)` for `X ~ Bin(total, random_rate)`.
    pub p_value: f64,
}

/// Draw `trials` values `10^U(log10_min, log10_max)` from the seeded RNG.
pub fn draw_samples(config: &CoverageConfig) -> Result<Vec<f64>, AppError> {
    if config.trials == 0 {
        return Err(AppError::new(2, "Coverage trials must be > 0."));
    }
    if !(config.log10_min.is_finite()
        && config.log10_max.is_finite()
        && config.log10_max > config.log10_min)
    {
        return Err(AppError::new(
            2,
            format!(
                "Invalid log10 range: [{}, {}] (must be finite with max > min).",
                config.log10_min, config.log10_max
            ),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let exponent = Uniform::new(config.log10_min, config.log10_max);
    Ok((0..config.trials)
        .map(|_| 10f64.powf(exponent.sample(&mut rng)))
        .collect())
}

/// Count values that `evaluate` marks on-lattice.
///
/// `max_error` is ignored: it decides whether a constant is reported at all,
/// not whether it sits on the lattice.
pub fn count_on_lattice(
    values: &[f64],
    max_m: u32,
    opts: &FitOptions,
    policy: &SelectionPolicy,
) -> Result<usize, AppError> {
    let policy = SelectionPolicy {
        max_error: None,
        ..*policy
    };
    validate_settings(max_m, opts, &policy)?;

    // Sampled values are finite and positive, so a failure here is a bug, not bad data.
    let flags: Vec<bool> = values
        .par_iter()
        .map(|&v| evaluate(&Constant::new("sample", v), max_m, opts, &policy).map(|e| e.on_lattice))
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::new(4, format!("Coverage sampling failed: {e}")))?;
    Ok(flags.iter().filter(|&&hit| hit).count())
}

/// Estimate the fraction of random values that are on-lattice under `policy`.
///
/// Deterministic for a given seed: samples are drawn sequentially, only the
/// fitting runs in parallel.
pub fn estimate_coverage(
    config: &CoverageConfig,
    max_m: u32,
    opts: &FitOptions,
    policy: &SelectionPolicy,
) -> Result<CoverageEstimate, AppError> {
    let samples = draw_samples(config)?;
    let hits = count_on_lattice(&samples, max_m, opts, policy)?;

    let rate = hits as f64 / config.trials as f64;
    debug!(trials = config.trials, hits, rate, "coverage estimated");
    Ok(CoverageEstimate {
        trials: config.trials,
        hits,
        rate,
    })
}

/// Compare `observed` successes out of `total` against `random_rate`.
pub fn significance(observed: usize, total: usize, random_rate: f64) -> Significance {
    let observed_rate = if total == 0 {
        0.0
    } else {
        observed as f64 / total as f64
    };
    let enrichment = (random_rate > 0.0).then(|| observed_rate / random_rate);
    Significance {
        observed,
        total,
        observed_rate,
        random_rate,
        enrichment,
        p_value: binomial_tail(total, observed, random_rate),
    }
}

/// Upper tail `P(X >= k)` for `X ~ Bin(n, p)`.
pub fn binomial_tail(n: usize, k: usize, p: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n || p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let ln_p = p.ln();
    let ln_q = (1.0 - p).ln();
    let tail: f64 = (k..=n)
        .map(|i| (ln_choose(n, i) + i as f64 * ln_p + (n - i) as f64 * ln_q).exp())
        .sum();
    tail.clamp(0.0, 1.0)
}

fn ln_choose(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (1..=k)
        .map(|j| ((n - k + j) as f64).ln() - (j as f64).ln())
        .sum()
}
