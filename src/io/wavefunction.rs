//! Two-column wavefunction table ingest.
//!
//! Tabulated radial wavefunctions (e.g. `001.wf-s0.dat`) are plain text with
//! one `radius amplitude` pair per line, sometimes surrounded by header or
//! footer lines. We keep every line with exactly two whitespace-separated
//! tokens and skip everything else.

use std::fs;
use std::path::Path;

use crate::domain::SampleSet;
use crate::error::{AppError, ErrorKind};

/// Read a wavefunction table from disk.
pub fn read_wavefunction(path: &Path) -> Result<SampleSet, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to read wavefunction file '{}': {e}", path.display()),
        )
    })?;
    parse_wavefunction(&text)
}

/// Parse wavefunction table contents.
pub fn parse_wavefunction(text: &str) -> Result<SampleSet, AppError> {
    let mut pairs = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [r, y] = tokens.as_slice() else {
            continue;
        };
        let line_no = idx + 1;
        pairs.push((parse_value(r, line_no)?, parse_value(y, line_no)?));
    }

    if pairs.is_empty() {
        return Err(AppError::invalid("Wavefunction table has no two-column rows."));
    }
    Ok(SampleSet::from_pairs(&pairs))
}

fn parse_value(token: &str, line: usize) -> Result<f64, AppError> {
    // Fortran writers sometimes emit `1.0D-03`.
    let normalized = token.replace(['D', 'd'], "E");
    normalized.parse::<f64>().map_err(|_| {
        AppError::new(
            ErrorKind::Parse,
            format!("Line {line}: '{token}' is not a number."),
        )
    })
}
