//! Terminal formatting for fit results.

use crate::domain::{FitResult, SampleSet};

/// Format the full run summary (dataset stats + escalation diagnostics + primitives).
pub fn format_fit_summary(samples: &SampleSet, fit: &FitResult) -> String {
    let mut out = String::new();

    out.push_str("=== gtofit - Gaussian basis fit ===\n");
    out.push_str(&format!("n: {}\n", fit.principal_n));
    match samples.radius_range() {
        Some((lo, hi)) => out.push_str(&format!(
            "Samples: n={} | r=[{lo:.4}, {hi:.4}]\n",
            samples.len()
        )),
        None => out.push_str(&format!("Samples: n={}\n", samples.len())),
    }
    match fit.tolerance {
        Some(tol) => out.push_str(&format!("Tolerance: {tol:e}\n")),
        None => out.push_str("Tolerance: none\n"),
    }

    out.push_str("\nAttempts:\n");
    for a in &fit.attempts {
        let chosen = if a.primitives == fit.primitive_count() { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} nz={:<3} L1={:.6e} error={:.6e} evals={} converged={}\n",
            a.primitives, a.loss, a.error, a.evaluations, a.converged
        ));
    }

    out.push_str(&format!(
        "\nResult: {} gaussians, error={:.6e}, success={}\n",
        fit.primitive_count(),
        fit.error,
        fit.success
    ));
    out.push_str(&format_primitive_table(fit));

    out
}

/// Format the primitive coefficients as an aligned table.
pub fn format_primitive_table(fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>4}  {:>20}  {:>20}\n", "i", "amplitude", "rate"));
    for (i, p) in fit.primitives().iter().enumerate() {
        out.push_str(&format!("{:>4}  {:>20.12e}  {:>20.12e}\n", i + 1, p.amplitude, p.rate));
    }
    out
}
