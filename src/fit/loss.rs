//! Objective and quality metric for the Gaussian fit.
//!
//! The minimizer works on the L1 loss (robust against the long, noisy tails
//! typical of tabulated wavefunctions), while acceptance uses the L2-based
//! [`achieved_error`]. The two are deliberately different.

use nalgebra::DVector;

use crate::error::AppError;
use crate::models::evaluate_at;

/// Split a flat parameter vector into `(amplitudes, rates)` halves.
pub fn split_params(params: &[f64]) -> (&[f64], &[f64]) {
    params.split_at(params.len() / 2)
}

/// Total absolute deviation between `targets` and the model at `radii`.
///
/// `params` holds `Nz` amplitudes followed by `Nz` rates.
pub fn l1_loss(params: &[f64], n: i32, radii: &[f64], targets: &[f64]) -> Result<f64, AppError> {
    if radii.len() != targets.len() {
        return Err(AppError::shape_mismatch(radii.len(), targets.len()));
    }
    if params.len() % 2 != 0 {
        return Err(AppError::invalid(format!(
            "Parameter vector must have even length, got {}.",
            params.len()
        )));
    }
    let (amplitudes, rates) = split_params(params);
    Ok(radii
        .iter()
        .zip(targets.iter())
        .map(|(&r, &y)| (y - evaluate_at(r, n, amplitudes, rates)).abs())
        .sum())
}

/// `||targets - fitted||_2 / N`.
///
/// Not a true RMS (that would divide by `sqrt(N)`); kept as-is so tolerances
/// stay comparable with existing basis-set conversions.
pub fn achieved_error(targets: &[f64], fitted: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let residual: DVector<f64> = DVector::from_vec(
        targets.iter().zip(fitted.iter()).map(|(y, f)| y - f).collect(),
    );
    residual.norm() / targets.len() as f64
}
