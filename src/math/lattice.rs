//! Arithmetic on the φ-lattice.
//!
//! Every positive value `v` has a base-φ logarithm `L = ln(v) / ln(φ)`. The
//! fitters split `L` into its nearest integer `n` and the remainder
//! `δ = L - n ∈ [-0.5, 0.5]`, then explain `δ` with `±φ^(-m)` terms.
//!
//! Numerical notes:
//! - φ is the closed form `(1 + √5) / 2`; no iteration is involved anywhere.
//! - `round` breaks `.5` ties away from zero, so `δ` may be exactly `-0.5`
//!   but never `+0.5`.

/// The golden ratio `(1 + √5) / 2`.
///
/// Written as a literal because `sqrt` is not `const`; the literal is the
/// shortest round-trip representation of the computed value (see tests).
pub const PHI: f64 = 1.618_033_988_749_895;

/// Natural logarithm of φ.
#[inline]
pub fn ln_phi() -> f64 {
    PHI.ln()
}

/// `log_φ(v)`. Returns NaN for `v <= 0`, like `f64::ln`.
#[inline]
pub fn log_phi(v: f64) -> f64 {
    v.ln() / ln_phi()
}

/// `φ^x`.
#[inline]
pub fn phi_pow(x: f64) -> f64 {
    PHI.powf(x)
}

/// Split `log_φ(v)` into `(n, δ)` with `n = round(log_φ(v))`.
///
/// Callers must pass a finite `v > 0`.
pub fn split_exponent(v: f64) -> (i32, f64) {
    let l = log_phi(v);
    let n = l.round();
    (n as i32, l - n)
}

/// Relative error `|approx / observed - 1|`.
///
/// `observed` must be non-zero; the fitters only ever pass positive values.
#[inline]
pub fn relative_error(approx: f64, observed: f64) -> f64 {
    (approx / observed - 1.0).abs()
}

/// Round `value` to the nearest multiple of `step` (`step <= 0` returns `value`).
pub fn quantize(value: f64, step: f64) -> f64 {
    if !(step.is_finite() && step > 0.0) {
        return value;
    }
    (value / step).round() * step
}
