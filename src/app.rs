//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads configuration from the environment (and `.env`)
//! - reads the wavefunction table
//! - runs the primitive-count search
//! - prints the report
//! - writes optional exports

use std::path::PathBuf;

use crate::domain::{Bounds, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Everything a `gtofit` run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub fit: FitConfig,
    /// Seed for the initial-guess RNG; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

/// Entry point for the `gtofit` binary.
pub fn run() -> Result<(), AppError> {
    let config = config_from_env()?;
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_fit_summary(&run.samples, &run.fit));

    if let Some(path) = &config.export_json {
        crate::io::export::write_fit_json(path, &run.samples, &run.fit)?;
        log::info!("Wrote fit JSON to {}", path.display());
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_fit_csv(path, &run.samples, &run.fit)?;
        log::info!("Wrote fit CSV to {}", path.display());
    }

    Ok(())
}

/// Build the run configuration from process environment variables (after `.env`).
pub fn config_from_env() -> Result<RunConfig, AppError> {
    dotenvy::dotenv().ok();
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Build the run configuration from an arbitrary key lookup.
///
/// Recognised keys:
/// - `GTOFIT_DATA` (required): wavefunction table path
/// - `GTOFIT_N`: principal quantum number (default 1)
/// - `GTOFIT_TOL`: error tolerance
/// - `GTOFIT_NZETA`: fixed primitive count
/// - `GTOFIT_NZETA_MIN` / `GTOFIT_NZETA_MAX`: search range (default 3..=20)
/// - `GTOFIT_BOUNDS`: `low,high` applied to every parameter
/// - `GTOFIT_SEED`: RNG seed
/// - `GTOFIT_MAX_EVALS`: objective evaluations per minimizer run
/// - `GTOFIT_EXPORT_JSON` / `GTOFIT_EXPORT_CSV`: output paths
pub fn config_from_lookup<F>(lookup: F) -> Result<RunConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let data_path = get("GTOFIT_DATA")
        .map(PathBuf::from)
        .ok_or_else(|| AppError::invalid("Missing GTOFIT_DATA in environment (.env)."))?;

    let mut fit = FitConfig::default();
    if let Some(v) = get("GTOFIT_N") {
        fit.principal_n = parse_key("GTOFIT_N", &v)?;
    }
    if let Some(v) = get("GTOFIT_TOL") {
        fit.tolerance = Some(parse_key("GTOFIT_TOL", &v)?);
    }
    if let Some(v) = get("GTOFIT_NZETA") {
        fit.fixed_primitives = Some(parse_key("GTOFIT_NZETA", &v)?);
    }
    if let Some(v) = get("GTOFIT_NZETA_MIN") {
        fit.min_primitives = parse_key("GTOFIT_NZETA_MIN", &v)?;
    }
    if let Some(v) = get("GTOFIT_NZETA_MAX") {
        fit.max_primitives = parse_key("GTOFIT_NZETA_MAX", &v)?;
    }
    if let Some(v) = get("GTOFIT_BOUNDS") {
        fit.bounds = Some(parse_bounds(&v)?);
    }
    if let Some(v) = get("GTOFIT_MAX_EVALS") {
        fit.simplex.max_evaluations = Some(parse_key("GTOFIT_MAX_EVALS", &v)?);
    }
    fit.validate()?;

    let seed = get("GTOFIT_SEED")
        .map(|v| parse_key("GTOFIT_SEED", &v))
        .transpose()?;

    Ok(RunConfig {
        data_path,
        fit,
        seed,
        export_json: get("GTOFIT_EXPORT_JSON").map(PathBuf::from),
        export_csv: get("GTOFIT_EXPORT_CSV").map(PathBuf::from),
    })
}

fn parse_key<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse::<T>()
        .map_err(|_| AppError::invalid(format!("Invalid value for {key}: '{value}'.")))
}

fn parse_bounds(value: &str) -> Result<Bounds, AppError> {
    let Some((low, high)) = value.split_once(',') else {
        return Err(AppError::invalid(format!(
            "Invalid value for GTOFIT_BOUNDS: '{value}' (expected `low,high`)."
        )));
    };
    Bounds::new(
        parse_key("GTOFIT_BOUNDS", low.trim())?,
        parse_key("GTOFIT_BOUNDS", high.trim())?,
    )
}
