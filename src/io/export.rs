//! Fit exports.
//!
//! - JSON: the portable representation of a fit (primitives, diagnostics, and the
//!   curves at the input radii, per-primitive components included). The schema
//!   is defined by `domain::FitFile`.
//! - CSV: one row per sample, meant for spreadsheets and external plotting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::domain::{FitFile, FitGrid, FitResult, SampleSet};
use crate::error::{AppError, ErrorKind};
use crate::models::components;

fn io_error(message: String) -> AppError {
    AppError::new(ErrorKind::Io, message)
}

/// Assemble the serializable view of a fit.
pub fn fit_file(samples: &SampleSet, fit: &FitResult) -> FitFile {
    FitFile {
        tool: "gtofit".to_string(),
        generated: Local::now(),
        principal_n: fit.principal_n,
        tolerance: fit.tolerance,
        success: fit.success,
        error: fit.error,
        primitives: fit.primitives(),
        attempts: fit.attempts.clone(),
        grid: FitGrid {
            radius: samples.radii().to_vec(),
            target: samples.amplitudes().to_vec(),
            fit: fit.fitted.clone(),
            components: components(samples.radii(), fit.principal_n, &fit.amplitudes, &fit.rates),
        },
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, samples: &SampleSet, fit: &FitResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| io_error(format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &fit_file(samples, fit))
        .map_err(|e| io_error(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| io_error(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Invalid fit JSON: {e}")))
}

/// Write per-sample curves to a CSV file.
///
/// Columns: `radius,target,fit,residual,g1..gN` where `gi` is primitive `i` alone.
pub fn write_fit_csv(path: &Path, samples: &SampleSet, fit: &FitResult) -> Result<(), AppError> {
    if fit.fitted.len() != samples.len() {
        return Err(AppError::shape_mismatch(samples.len(), fit.fitted.len()));
    }

    let file = File::create(path)
        .map_err(|e| io_error(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let parts = components(samples.radii(), fit.principal_n, &fit.amplitudes, &fit.rates);

    let mut header = String::from("radius,target,fit,residual");
    for i in 1..=parts.len() {
        header.push_str(&format!(",g{i}"));
    }
    writeln!(out, "{header}").map_err(|e| io_error(format!("Failed to write export CSV header: {e}")))?;

    for (i, (&r, &y)) in samples.radii().iter().zip(samples.amplitudes().iter()).enumerate() {
        let y_fit = fit.fitted[i];
        let mut row = format!("{r:.10e},{y:.10e},{y_fit:.10e},{:.10e}", y - y_fit);
        for part in &parts {
            row.push_str(&format!(",{:.10e}", part[i]));
        }
        writeln!(out, "{row}").map_err(|e| io_error(format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| io_error(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
