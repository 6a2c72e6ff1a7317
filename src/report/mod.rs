//! Reporting utilities: formatted terminal output.
//!
//! We keep formatting code in one place so the fitting code stays clean and
//! output changes are localized.

pub mod format;

pub use format::*;
