//! Primitive-count escalation around the bounded simplex minimizer.
//!
//! For each candidate primitive count `nz` (increasing):
//!
//! - draw `nz` amplitudes and `nz` rates uniformly in `[0, 1)` from the caller's RNG
//! - minimize the L1 loss, with per-parameter bounds expanded fresh for `nz`
//! - evaluate the fitted curve and its achieved error
//! - stop as soon as the error drops below the tolerance
//!
//! Running out of primitive counts is not an error: the last attempt is
//! returned with `success = false`.

use log::{debug, info, warn};
use nalgebra::DVector;
use rand::Rng;

use crate::domain::{Attempt, FitConfig, FitResult, SampleSet};
use crate::error::AppError;
use crate::fit::loss::{achieved_error, l1_loss, split_params};
use crate::math::minimize;
use crate::models::evaluate;

/// Fit a [`SampleSet`].
pub fn fit_samples<R: Rng>(
    samples: &SampleSet,
    config: &FitConfig,
    rng: &mut R,
) -> Result<FitResult, AppError> {
    fit(samples.radii(), samples.amplitudes(), config, rng)
}

/// Fit a sum of radial Gaussians to `(radii, targets)`.
///
/// Reproducibility is entirely controlled by `rng`: the same seed and inputs
/// give the same result. Unequal `radii`/`targets` lengths fail with
/// `ShapeMismatch` before any other check.
pub fn fit<R: Rng>(
    radii: &[f64],
    targets: &[f64],
    config: &FitConfig,
    rng: &mut R,
) -> Result<FitResult, AppError> {
    if radii.len() != targets.len() {
        return Err(AppError::shape_mismatch(radii.len(), targets.len()));
    }
    config.validate()?;
    if radii.is_empty() {
        return Err(AppError::invalid("No samples to fit."));
    }

    let n = config.principal_n;
    if n < 1 && radii.iter().any(|&r| r == 0.0) {
        return Err(AppError::invalid(format!(
            "r^(n-1) is singular at r = 0 for n = {n}; drop the zero radius or use n >= 1."
        )));
    }

    let tolerance = config.effective_tolerance();
    let mut attempts = Vec::new();
    let mut last: Option<FitResult> = None;

    for nz in config.primitive_counts() {
        let x0 = DVector::from_iterator(2 * nz, (0..2 * nz).map(|_| rng.gen_range(0.0..1.0)));
        let bounds = config.bounds.map(|b| b.expand(nz));

        let minimum = minimize(
            |x: &DVector<f64>| l1_loss(x.as_slice(), n, radii, targets).unwrap_or(f64::INFINITY),
            &x0,
            bounds.as_deref(),
            &config.simplex,
        );

        let (amplitudes, rates) = split_params(minimum.x.as_slice());
        let fitted = evaluate(radii, n, amplitudes, rates);
        let mut error = achieved_error(targets, &fitted);
        if !error.is_finite() {
            warn!("Non-finite fit error for {nz} gaussians; treating the attempt as failed.");
            error = f64::INFINITY;
        }

        debug!(
            "nz={nz}: loss={:.6e} error={:.6e} evals={} converged={}",
            minimum.fun, error, minimum.evaluations, minimum.converged
        );
        attempts.push(Attempt {
            primitives: nz,
            loss: minimum.fun,
            error,
            evaluations: minimum.evaluations,
            converged: minimum.converged,
        });

        let success = tolerance.is_some_and(|tol| error < tol);
        last = Some(FitResult {
            principal_n: n,
            amplitudes: amplitudes.to_vec(),
            rates: rates.to_vec(),
            fitted,
            error,
            success,
            tolerance,
            attempts: Vec::new(),
        });
        if success {
            break;
        }
    }

    let Some(mut result) = last else {
        return Err(AppError::invalid("Primitive count range is empty."));
    };
    result.attempts = attempts;

    if !result.success {
        let nz = result.primitive_count();
        match tolerance {
            None => info!("Fitting error is {:e} for {nz} gaussians.", result.error),
            Some(tol) => warn!(
                "Fitting error {:e} didn't meet the tolerance {tol:e} for {nz} gaussians.",
                result.error
            ),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bounds;
    use crate::error::ErrorKind;
    use crate::math::SimplexOptions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn single_gaussian(count: usize) -> (Vec<f64>, Vec<f64>) {
        let radii: Vec<f64> = (0..count)
            .map(|i| 5.0 * i as f64 / (count as f64 - 1.0))
            .collect();
        let targets = radii.iter().map(|&r| 2.0 * (-1.5 * r * r).exp()).collect();
        (radii, targets)
    }

    fn quick_simplex() -> SimplexOptions {
        SimplexOptions {
            max_evaluations: Some(600),
            restarts: 1,
            ..SimplexOptions::default()
        }
    }

    #[test]
    fn recovers_single_gaussian() {
        let (radii, targets) = single_gaussian(50);
        let config = FitConfig {
            principal_n: 1,
            fixed_primitives: Some(1),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();

        assert_eq!(fit.primitive_count(), 1);
        assert!((fit.amplitudes[0] - 2.0).abs() < 0.06, "A={}", fit.amplitudes[0]);
        assert!((fit.rates[0] - 1.5).abs() < 0.045, "a={}", fit.rates[0]);
        assert!(fit.error < 1e-3, "error={}", fit.error);
        // Nothing to meet without a tolerance.
        assert!(!fit.success);
        assert_eq!(fit.tolerance, None);
    }

    #[test]
    fn loose_tolerance_stops_at_minimum_count() {
        let (radii, targets) = single_gaussian(20);
        let config = FitConfig {
            tolerance: Some(10.0),
            simplex: quick_simplex(),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();

        assert!(fit.success);
        assert_eq!(fit.primitive_count(), 3);
        assert_eq!(fit.attempts.len(), 1);
    }

    #[test]
    fn unreachable_tolerance_returns_last_attempt() {
        let (radii, targets) = single_gaussian(20);
        let config = FitConfig {
            tolerance: Some(1e-30),
            min_primitives: 3,
            max_primitives: 3,
            simplex: quick_simplex(),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();

        assert!(!fit.success);
        assert_eq!(fit.fitted.len(), radii.len());
        assert_eq!(fit.primitive_count(), 3);
        assert!(fit.error.is_finite());
    }

    #[test]
    fn bounds_follow_each_primitive_count() {
        let (radii, targets) = single_gaussian(20);
        let config = FitConfig {
            tolerance: Some(1e-30),
            min_primitives: 2,
            max_primitives: 4,
            bounds: Some(Bounds::new(0.0, 3.0).unwrap()),
            simplex: quick_simplex(),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();

        let counts: Vec<usize> = fit.attempts.iter().map(|a| a.primitives).collect();
        assert_eq!(counts, vec![2, 3, 4]);
        assert_eq!(fit.amplitudes.len(), 4);
        assert_eq!(fit.rates.len(), 4);
        assert!(
            fit.amplitudes
                .iter()
                .chain(fit.rates.iter())
                .all(|&v| (0.0..=3.0).contains(&v))
        );
    }

    #[test]
    fn same_seed_gives_identical_results() {
        let (radii, targets) = single_gaussian(25);
        let config = FitConfig {
            tolerance: Some(1e-4),
            min_primitives: 1,
            max_primitives: 2,
            simplex: quick_simplex(),
            ..FitConfig::default()
        };
        let a = fit(&radii, &targets, &config, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = fit(&radii, &targets, &config, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_samples_fail_before_fitting() {
        let config = FitConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let err = fit(&[0.0, 1.0, 2.0], &[1.0, 0.5], &config, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn shape_mismatch_wins_over_invalid_config() {
        let config = FitConfig {
            principal_n: 0,
            min_primitives: 5,
            max_primitives: 4,
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = fit(&[0.0, 1.0, 2.0], &[1.0, 0.5], &config, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn non_finite_error_escalates_every_count() {
        let (radii, mut targets) = single_gaussian(20);
        targets[3] = f64::NAN;
        let config = FitConfig {
            tolerance: Some(1e-3),
            min_primitives: 1,
            max_primitives: 3,
            simplex: quick_simplex(),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();

        assert!(!fit.success);
        assert_eq!(fit.attempts.len(), 3);
        assert!(fit.attempts.iter().all(|a| a.error == f64::INFINITY));
        assert_eq!(fit.error, f64::INFINITY);
        assert_eq!(fit.fitted.len(), radii.len());
    }

    #[test]
    fn rejects_singular_prefactor_at_origin() {
        let config = FitConfig {
            principal_n: 0,
            fixed_primitives: Some(1),
            ..FitConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = fit(&[0.0, 1.0], &[1.0, 0.5], &config, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn l1_fit_shrugs_off_an_outlier() {
        let (radii, mut targets) = single_gaussian(50);
        let mut rng = StdRng::seed_from_u64(11);
        let noise = Normal::new(0.0, 1e-4).unwrap();
        for y in targets.iter_mut() {
            *y += noise.sample(&mut rng);
        }
        targets[5] += 1.0;

        let config = FitConfig {
            fixed_primitives: Some(1),
            ..FitConfig::default()
        };
        let fit = fit(&radii, &targets, &config, &mut rng).unwrap();
        assert!((fit.amplitudes[0] - 2.0).abs() < 0.1, "A={}", fit.amplitudes[0]);
        assert!((fit.rates[0] - 1.5).abs() < 0.075, "a={}", fit.rates[0]);
    }
}
