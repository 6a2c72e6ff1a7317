//! Mathematical utilities: the bounded simplex minimizer.

pub mod simplex;

pub use simplex::*;
