//! Gaussian basis fitting.
//!
//! Responsibilities:
//!
//! - L1 objective and achieved-error metric (`loss`)
//! - primitive-count escalation around the simplex minimizer (`fitter`)

pub mod fitter;
pub mod loss;

pub use fitter::*;
pub use loss::*;
