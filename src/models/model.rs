//! Radial Gaussian-type model evaluation.
//!
//! The fitted function is
//!
//! ```text
//! f(r) = Σ_i A_i * r^(n-1) * exp(-a_i * r^2)
//! ```
//!
//! `r^(n-1)` is an integer power. For `n < 1` and `r = 0` it evaluates to `+inf`
//! (IEEE `0^negative`); callers must keep zero radii away from such `n`.

/// Value of a single primitive at radius `r`.
#[inline]
pub fn primitive_value(r: f64, n: i32, amplitude: f64, rate: f64) -> f64 {
    amplitude * r.powi(n - 1) * (-rate * r * r).exp()
}

/// Value of the primitive sum at a single radius.
///
/// # Panics
/// Debug builds assert `amplitudes.len() == rates.len()`.
pub fn evaluate_at(r: f64, n: i32, amplitudes: &[f64], rates: &[f64]) -> f64 {
    debug_assert_eq!(amplitudes.len(), rates.len());
    if amplitudes.is_empty() {
        return 0.0;
    }
    let prefactor = r.powi(n - 1);
    let r2 = r * r;
    amplitudes
        .iter()
        .zip(rates.iter())
        .map(|(&a_i, &rate)| a_i * prefactor * (-rate * r2).exp())
        .sum()
}

/// Evaluate the primitive sum at every radius.
pub fn evaluate(radii: &[f64], n: i32, amplitudes: &[f64], rates: &[f64]) -> Vec<f64> {
    radii
        .iter()
        .map(|&r| evaluate_at(r, n, amplitudes, rates))
        .collect()
}

/// Per-primitive curves at every radius (one inner vector per primitive).
pub fn components(radii: &[f64], n: i32, amplitudes: &[f64], rates: &[f64]) -> Vec<Vec<f64>> {
    amplitudes
        .iter()
        .zip(rates.iter())
        .map(|(&a_i, &rate)| {
            radii
                .iter()
                .map(|&r| primitive_value(r, n, a_i, rate))
                .collect()
        })
        .collect()
}
