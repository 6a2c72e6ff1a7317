//! Input/output helpers.
//!
//! - wavefunction table ingest (`wavefunction`)
//! - fit exports (JSON/CSV) (`export`)

pub mod export;
pub mod wavefunction;

pub use export::*;
pub use wavefunction::*;
