//! Gaussian-type orbital model.
//!
//! The model is implemented as small, pure functions so that the loss and
//! fitting code can stay generic.

pub mod model;

pub use model::*;
