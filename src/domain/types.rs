//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::SimplexOptions;

/// Default smallest primitive count tried by the escalation search.
pub const DEFAULT_MIN_PRIMITIVES: usize = 3;

/// Default largest primitive count tried by the escalation search.
pub const DEFAULT_MAX_PRIMITIVES: usize = 20;

/// Tolerance used when neither a tolerance nor a fixed primitive count is given.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-5;

/// Tabulated radial wavefunction: `(r_i, y_i)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    radii: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl SampleSet {
    pub fn new(radii: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self, AppError> {
        if radii.len() != amplitudes.len() {
            return Err(AppError::shape_mismatch(radii.len(), amplitudes.len()));
        }
        Ok(Self { radii, amplitudes })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            radii: pairs.iter().map(|p| p.0).collect(),
            amplitudes: pairs.iter().map(|p| p.1).collect(),
        }
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// `(min, max)` of the radii, or `None` when empty.
    pub fn radius_range(&self) -> Option<(f64, f64)> {
        let mut it = self.radii.iter().copied().filter(|r| r.is_finite());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r))))
    }
}

/// One Gaussian term `A * r^(n-1) * exp(-a * r^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub amplitude: f64,
    pub rate: f64,
}

/// A single `(low, high)` box applied to every amplitude and every rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Result<Self, AppError> {
        let bounds = Self { low, high };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.low.is_nan() || self.high.is_nan() || self.low > self.high {
            return Err(AppError::invalid(format!(
                "Invalid bounds: low={}, high={} (need low <= high).",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// Per-parameter bounds for a vector of `nz` amplitudes followed by `nz` rates.
    ///
    /// Always built from the configured pair, so the length tracks `nz`.
    pub fn expand(&self, nz: usize) -> Vec<(f64, f64)> {
        vec![(self.low, self.high); 2 * nz]
    }
}

/// Fitting options for a single shell.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Principal quantum number; the model carries an `r^(n-1)` prefactor.
    pub principal_n: i32,
    /// Stop escalating once the achieved error drops below this value.
    pub tolerance: Option<f64>,
    /// Fit exactly this many primitives instead of searching a range.
    pub fixed_primitives: Option<usize>,
    pub min_primitives: usize,
    pub max_primitives: usize,
    pub bounds: Option<Bounds>,
    /// Safeguards for the underlying minimizer.
    pub simplex: SimplexOptions,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            principal_n: 1,
            tolerance: None,
            fixed_primitives: None,
            min_primitives: DEFAULT_MIN_PRIMITIVES,
            max_primitives: DEFAULT_MAX_PRIMITIVES,
            bounds: None,
            simplex: SimplexOptions::default(),
        }
    }
}

impl FitConfig {
    /// Primitive counts to try, in order.
    pub fn primitive_counts(&self) -> std::ops::RangeInclusive<usize> {
        match self.fixed_primitives {
            Some(nz) => nz..=nz,
            None => self.min_primitives..=self.max_primitives,
        }
    }

    /// Tolerance actually used by the search.
    ///
    /// A range search without an explicit tolerance falls back to
    /// [`DEFAULT_TOLERANCE`]; a fixed count without one runs untargeted.
    pub fn effective_tolerance(&self) -> Option<f64> {
        match (self.tolerance, self.fixed_primitives) {
            (Some(tol), _) => Some(tol),
            (None, None) => Some(DEFAULT_TOLERANCE),
            (None, Some(_)) => None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self.fixed_primitives {
            Some(0) => return Err(AppError::invalid("Fixed primitive count must be >= 1.")),
            Some(_) => {}
            None => {
                if self.min_primitives == 0 {
                    return Err(AppError::invalid("Minimum primitive count must be >= 1."));
                }
                if self.min_primitives > self.max_primitives {
                    return Err(AppError::invalid(format!(
                        "Primitive range is empty: min={} > max={}.",
                        self.min_primitives, self.max_primitives
                    )));
                }
            }
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(AppError::invalid(format!("Tolerance must be finite and > 0, got {tol}.")));
            }
        }
        if let Some(bounds) = &self.bounds {
            bounds.validate()?;
        }
        Ok(())
    }
}

/// Diagnostics for one primitive count tried by the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub primitives: usize,
    /// Final L1 loss reported by the minimizer.
    pub loss: f64,
    /// Achieved error (`||y - fit||_2 / N`).
    pub error: f64,
    pub evaluations: usize,
    pub converged: bool,
}

/// Output of one fitter invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub principal_n: i32,
    pub amplitudes: Vec<f64>,
    pub rates: Vec<f64>,
    /// Fitted curve at the input radii.
    pub fitted: Vec<f64>,
    pub error: f64,
    pub success: bool,
    /// Tolerance the search was judged against, if any.
    pub tolerance: Option<f64>,
    pub attempts: Vec<Attempt>,
}

impl FitResult {
    pub fn primitive_count(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn primitives(&self) -> Vec<Primitive> {
        self.amplitudes
            .iter()
            .zip(self.rates.iter())
            .map(|(&amplitude, &rate)| Primitive { amplitude, rate })
            .collect()
    }
}

/// A saved fit (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated: DateTime<Local>,
    pub principal_n: i32,
    pub tolerance: Option<f64>,
    pub success: bool,
    pub error: f64,
    pub primitives: Vec<Primitive>,
    pub attempts: Vec<Attempt>,
    pub grid: FitGrid,
}

/// Curves sampled at the input radii.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub radius: Vec<f64>,
    pub target: Vec<f64>,
    pub fit: Vec<f64>,
    /// One curve per primitive, in primitive order.
    pub components: Vec<Vec<f64>>,
}
