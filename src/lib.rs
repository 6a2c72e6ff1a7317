//! `gto-fit` library crate.
//!
//! Fits sums of radial Gaussian-type primitives to tabulated atomic-orbital
//! wavefunctions. The binary (`gtofit`) is a thin wrapper around this library so
//! that:
//!
//! - core logic is testable without spawning processes
//! - the fitter can be driven programmatically by batch tools

pub mod app;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
