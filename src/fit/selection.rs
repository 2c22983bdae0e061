//! Form selection (single vs double correction) with guardrails.
//!
//! For each constant:
//! 1. Fit the best single correction.
//! 2. If its coefficient falls outside the open band `|c - 1| < tolerance`,
//!    also fit the best double correction.
//! 3. Report the double form only when it leaves less than `double_gain ×` the
//!    residual of the unit-coefficient single lattice point.
//! 4. Optionally reject the constant when the chosen fit's relative error
//!    exceeds `max_error`.

use tracing::debug;

use crate::domain::{Constant, Evaluation, FitForm, FitOptions, SelectionPolicy};
use crate::error::{FitError, PhiResult};
use crate::fit::double::best_double_fit_with;
use crate::fit::single::best_single_fit_with;

/// Evaluate one constant under the given options and policy.
pub fn evaluate(
    constant: &Constant,
    max_m: u32,
    opts: &FitOptions,
    policy: &SelectionPolicy,
) -> PhiResult<Evaluation> {
    let single = best_single_fit_with(constant.value, max_m, opts).map_err(|e| named(constant, e))?;

    let needs_double = !policy.accepts(&single);
    let mut double = None;
    let mut form = FitForm::Single;

    if needs_double && max_m >= 2 {
        let fit = best_double_fit_with(constant.value, max_m, opts).map_err(|e| named(constant, e))?;
        if fit.residual < policy.double_gain * single.unit_residual() {
            form = FitForm::Double;
        }
        double = Some(fit);
    }

    let on_lattice = policy.accepts(&single) || form == FitForm::Double;

    let mut evaluation = Evaluation {
        constant: constant.clone(),
        single,
        double,
        form,
        on_lattice,
        sigma: None,
    };
    evaluation.sigma = constant
        .uncertainty
        .filter(|u| u.is_finite() && *u > 0.0)
        .map(|u| (evaluation.approx() - constant.value).abs() / u);

    if let Some(limit) = policy.max_error {
        let err = evaluation.relative_error();
        if err > limit {
            return Err(FitError::NoFitFound(format!(
                "{}: best fit {} misses by {:.4}% (limit {:.4}%)",
                constant.name,
                evaluation.formula(),
                err * 100.0,
                limit * 100.0
            )));
        }
    }

    debug!(
        name = %constant.name,
        form = evaluation.form.label(),
        formula = %evaluation.formula(),
        error = evaluation.relative_error(),
        on_lattice,
        "evaluated constant"
    );
    Ok(evaluation)
}

/// Validate tuning knobs once per run instead of per constant.
pub fn validate_settings(max_m: u32, opts: &FitOptions, policy: &SelectionPolicy) -> PhiResult<()> {
    if max_m < 1 {
        return Err(FitError::InvalidInput(format!("max_m must be >= 1, got {max_m}")));
    }
    if !(opts.coefficient_step.is_finite() && opts.coefficient_step >= 0.0) {
        return Err(FitError::InvalidInput(
            "coefficient step must be finite and >= 0".to_string(),
        ));
    }
    if !(opts.exact_tolerance.is_finite() && opts.exact_tolerance >= 0.0) {
        return Err(FitError::InvalidInput(
            "exact tolerance must be finite and >= 0".to_string(),
        ));
    }
    if !(policy.tolerance.is_finite() && policy.tolerance >= 0.0) {
        return Err(FitError::InvalidInput(
            "coefficient tolerance must be finite and >= 0".to_string(),
        ));
    }
    if !(policy.double_gain.is_finite() && policy.double_gain > 0.0) {
        return Err(FitError::InvalidInput(
            "double gain must be finite and > 0".to_string(),
        ));
    }
    if let Some(limit) = policy.max_error {
        if !(limit.is_finite() && limit > 0.0) {
            return Err(FitError::InvalidInput(
                "max error must be finite and > 0".to_string(),
            ));
        }
    }
    Ok(())
}

fn named(constant: &Constant, err: FitError) -> FitError {
    match err {
        FitError::InvalidInput(msg) => FitError::InvalidInput(format!("{}: {msg}", constant.name)),
        FitError::NoFitFound(msg) => FitError::NoFitFound(format!("{}: {msg}", constant.name)),
    }
}
