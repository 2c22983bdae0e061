//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - `fit` and `show` print exactly the same tables

use crate::coverage::{BaseComparison, CoverageEstimate, Significance};
use crate::domain::{
    CoverageConfig, DoubleFitResult, Evaluation, Failure, FitForm, FitResult, RunFile,
};

/// Format the run header (source, search settings, headline counts).
pub fn format_run_summary(run: &RunFile) -> String {
    let mut out = String::new();
    let on_lattice = run.evaluations.iter().filter(|e| e.on_lattice).count();

    out.push_str("=== phifit - nested φ-lattice fit ===\n");
    out.push_str(&format!("Source: {}\n", run.source));
    out.push_str(&format!(
        "Search: max_m={} | c step={} | tie-break={:?}\n",
        run.max_m, run.options.coefficient_step, run.options.tie_break
    ));
    out.push_str(&format!(
        "Policy: |c-1| < {:.2} | double gain {:.2}{}\n",
        run.policy.tolerance,
        run.policy.double_gain,
        run.policy
            .max_error
            .map(|e| format!(" | max error {:.4}%", e * 100.0))
            .unwrap_or_default()
    ));
    out.push_str(&format!(
        "Evaluated: {} | on-lattice: {} | failed: {}\n",
        run.evaluations.len(),
        on_lattice,
        run.failures.len()
    ));
    out.push('\n');
    out
}

/// Format the per-constant fit table.
pub fn format_evaluations(evaluations: &[Evaluation]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<22} {:>14} {:<6} {:>4} {:>5} {:>4} {:>6} {:>14} {:>10} {:>10}  {}\n",
            "name", "value", "form", "n", "m", "sign", "c", "approx", "error%", "sigma", "formula"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<22} {:-<14} {:-<6} {:-<4} {:-<5} {:-<4} {:-<6} {:-<14} {:-<10} {:-<10}  {:-<7}\n",
            "", "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for e in evaluations {
        let (m, sign, c) = match (&e.form, &e.double) {
            (FitForm::Double, Some(d)) => (
                format!("{},{}", d.first.m, d.second.m),
                format!("{}{}", d.first.sign.symbol(), d.second.sign.symbol()),
                "1.00".to_string(),
            ),
            _ => single_columns(&e.single),
        };
        let marker = if e.on_lattice { "" } else { "  (off-lattice)" };
        out.push_str(
            format!(
                "{:<22} {:>14} {:<6} {:>4} {:>5} {:>4} {:>6} {:>14} {:>10.4} {:>10}  {}{marker}\n",
                truncate(&e.constant.name, 22),
                fmt_value(e.constant.value),
                e.form.label(),
                e.n(),
                m,
                sign,
                c,
                fmt_value(e.approx()),
                e.relative_error() * 100.0,
                e.sigma.map(|s| format!("{s:.3e}")).unwrap_or_else(|| "-".to_string()),
                e.formula(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format failed rows/constants (empty string when there are none).
pub fn format_failures(failures: &[Failure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nFailures:\n");
    for f in failures {
        let line = f.line.map(|l| format!("line {l}: ")).unwrap_or_default();
        let name = f.name.as_deref().map(|n| format!("[{n}] ")).unwrap_or_default();
        out.push_str(&format!("- {line}{name}{}\n", f.message));
    }
    out
}

/// Format the `check` command output for one value.
pub fn format_check(value: f64, single: &FitResult, double: Option<&DoubleFitResult>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Value: {}\n", fmt_value(value)));
    out.push_str(&format!(
        "log_φ: {:.6}\n\n",
        crate::math::log_phi(value)
    ));

    let (m, sign, c) = single_columns(single);
    out.push_str("Single correction:\n");
    out.push_str(&format!("- formula: {}\n", single.formula()));
    out.push_str(&format!("- n={} m={m} sign={sign} c={c} (raw {:.6})\n", single.n, single.raw_coefficient));
    out.push_str(&format!(
        "- approx: {} | error: {:.6}%\n",
        fmt_value(single.approx),
        single.relative_error * 100.0
    ));

    if let Some(d) = double {
        out.push_str("\nDouble correction:\n");
        out.push_str(&format!("- formula: {}\n", d.formula()));
        out.push_str(&format!(
            "- approx: {} | error: {:.6}% | exponent residual: {:.3e}\n",
            fmt_value(d.approx),
            d.relative_error * 100.0,
            d.residual
        ));
    }

    out
}

/// Format the lattice coverage baseline and the batch's significance.
pub fn format_coverage(
    estimate: &CoverageEstimate,
    significance: &Significance,
    tolerance: f64,
    config: &CoverageConfig,
) -> String {
    let mut out = String::new();
    out.push_str("=== phifit - lattice coverage baseline ===\n");
    out.push_str(&format!(
        "Random values: 10^U({}, {}) | trials={} | seed={}\n",
        config.log10_min, config.log10_max, estimate.trials, config.seed
    ));
    out.push_str(&format!(
        "Coverage with |c-1| < {tolerance:.2}: {}/{} = {:.2}%\n\n",
        estimate.hits,
        estimate.trials,
        estimate.rate * 100.0
    ));
    out.push_str(&format!(
        "Observed on-lattice: {}/{} = {:.2}%\n",
        significance.observed,
        significance.total,
        significance.observed_rate * 100.0
    ));
    match significance.enrichment {
        Some(x) => out.push_str(&format!("Enrichment: {x:.2}x\n")),
        None => out.push_str("Enrichment: n/a (random coverage is zero)\n"),
    }
    out.push_str(&format!(
        "P(>= {} on-lattice by chance) = {:.4e}\n",
        significance.observed, significance.p_value
    ));
    out
}

/// Format the alternative-base table (resonance count and mean deviation per base).
pub fn format_base_comparison(rows: &[BaseComparison], threshold: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nAlternative bases (resonant: |log_b(v) - round| < {threshold:.2}):\n"));
    out.push_str(&format!(
        "{:<8} {:>10} {:>10} {:>9} {:>9}\n",
        "base", "value", "resonant", "rate%", "mean dev"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:>10.6} {:>10} {:>9.1} {:>9.4}\n",
            row.name,
            row.base,
            format!("{}/{}", row.resonant, row.total),
            row.resonance_rate * 100.0,
            row.mean_deviation
        ));
    }
    out
}

fn single_columns(fit: &FitResult) -> (String, String, String) {
    match fit.m {
        Some(m) => (m.to_string(), fit.sign.symbol().to_string(), fit.coefficient_label()),
        None => ("-".to_string(), "-".to_string(), fit.coefficient_label()),
    }
}

fn fmt_value(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && (a >= 1e6 || a < 1e-3) {
        format!("{v:.6e}")
    } else {
        format!("{v:.6}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{STANDARD_BASES, compare_bases, significance};
    use crate::domain::{Constant, FitOptions, SelectionPolicy};
    use crate::fit::double::best_double_fit;
    use crate::fit::selection::evaluate;
    use crate::fit::single::best_single_fit;
    use crate::math::PHI;

    fn evaluation(name: &str, value: f64) -> Evaluation {
        evaluate(
            &Constant::new(name, value),
            10,
            &FitOptions::default(),
            &SelectionPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn table_lists_formula_and_error() {
        let table = format_evaluations(&[evaluation("mp/me", 1836.152_673_43)]);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("mp/me"));
        assert!(row.contains("φ^(16 - 1.00×φ^(-2))"), "{row}");
        assert!(row.contains("0.0155"), "{row}");
    }

    #[test]
    fn failures_section_is_empty_without_failures() {
        assert!(format_failures(&[]).is_empty());
        let text = format_failures(&[Failure {
            line: Some(4),
            name: Some("bad".to_string()),
            message: "Invalid value 'abc'.".to_string(),
        }]);
        assert!(text.contains("line 4: [bad] Invalid value"));
    }

    #[test]
    fn check_output_lists_both_corrections() {
        let value = 1836.152_673_43;
        let single = best_single_fit(value, 10).unwrap();
        let double = best_double_fit(value, 10).unwrap();
        let text = format_check(value, &single, Some(&double));
        assert!(text.starts_with("Value: 1836.152673\n"), "{text}");
        assert!(text.contains("- formula: φ^(16 - 1.00×φ^(-2))"), "{text}");
        assert!(text.contains("- n=16 m=2 sign=- c=1.00"), "{text}");
        assert!(text.contains("Double correction:"));
        assert!(text.contains(&double.formula()));

        let exact = best_single_fit(PHI.powi(5), 10).unwrap();
        let text = format_check(PHI.powi(5), &exact, None);
        assert!(text.contains("- formula: φ^(5)"), "{text}");
        assert!(text.contains("m=- sign=- c=0"), "{text}");
        assert!(!text.contains("Double correction:"));
    }

    #[test]
    fn coverage_output_reports_rates_and_p_value() {
        let config = CoverageConfig {
            trials: 200,
            log10_min: -6.0,
            log10_max: 6.0,
            seed: 9,
        };
        let estimate = CoverageEstimate {
            trials: 200,
            hits: 50,
            rate: 0.25,
        };
        let sig = significance(18, 21, 0.25);
        let text = format_coverage(&estimate, &sig, 0.3, &config);
        assert!(text.contains("trials=200 | seed=9"), "{text}");
        assert!(text.contains("Coverage with |c-1| < 0.30: 50/200 = 25.00%"), "{text}");
        assert!(text.contains("Observed on-lattice: 18/21 = 85.71%"), "{text}");
        assert!(text.contains("Enrichment: 3.43x"), "{text}");
        assert!(text.contains("P(>= 18 on-lattice by chance) = "));

        let none = significance(0, 4, 0.0);
        assert!(format_coverage(&estimate, &none, 0.3, &config).contains("Enrichment: n/a"));
    }

    #[test]
    fn base_table_has_a_row_per_base() {
        let rows = compare_bases(&[PHI.powi(4), 2.0], &STANDARD_BASES, 0.15).unwrap();
        let text = format_base_comparison(&rows, 0.15);
        assert_eq!(text.lines().count(), 3 + STANDARD_BASES.len());
        assert!(text.contains("< 0.15"));
        let phi_row = text.lines().nth(3).unwrap();
        assert!(phi_row.starts_with("φ"), "{phi_row}");
        assert!(phi_row.contains("1/2"), "{phi_row}");
    }

    #[test]
    fn large_values_use_scientific_notation() {
        assert_eq!(fmt_value(4.96e16), "4.960000e16");
        assert_eq!(fmt_value(137.036), "137.036000");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("M_Planck/M_weak", 8), "M_Planc.");
        assert_eq!(truncate("V_us", 8), "V_us");
    }
}
