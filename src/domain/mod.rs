//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input samples (`SampleSet`) and per-term parameters (`Primitive`, `Bounds`)
//! - fit configuration (`FitConfig`)
//! - fit outputs (`FitResult`, `Attempt`, `FitFile`)

pub mod types;

pub use types::*;
