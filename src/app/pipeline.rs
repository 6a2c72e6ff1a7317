//! Shared "fit pipeline" logic.
//!
//! Read table -> seed RNG -> primitive-count search. Printing and exporting
//! stay in `app`.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::RunConfig;
use crate::domain::{FitResult, SampleSet};
use crate::error::AppError;
use crate::fit::fit_samples;
use crate::io::wavefunction::read_wavefunction;

/// All computed outputs of a single `gtofit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: SampleSet,
    pub fit: FitResult,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let samples = read_wavefunction(&config.data_path)?;
    log::info!(
        "Loaded {} samples from {}",
        samples.len(),
        config.data_path.display()
    );
    run_fit_with_samples(config, samples)
}

/// Execute the fitting pipeline on samples already in memory.
pub fn run_fit_with_samples(config: &RunConfig, samples: SampleSet) -> Result<RunOutput, AppError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let fit = fit_samples(&samples, &config.fit, &mut rng)?;
    Ok(RunOutput { samples, fit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitConfig;
    use crate::models::evaluate;

    #[test]
    fn seeded_pipeline_is_reproducible() {
        let radii: Vec<f64> = (0..30).map(|i| i as f64 * 0.1).collect();
        let targets = evaluate(&radii, 2, &[0.9], &[0.6]);
        let samples = SampleSet::new(radii, targets).unwrap();
        let config = RunConfig {
            data_path: "unused.dat".into(),
            fit: FitConfig {
                principal_n: 2,
                fixed_primitives: Some(1),
                ..FitConfig::default()
            },
            seed: Some(5),
            export_json: None,
            export_csv: None,
        };

        let a = run_fit_with_samples(&config, samples.clone()).unwrap();
        let b = run_fit_with_samples(&config, samples).unwrap();
        assert_eq!(a.fit, b.fit);
        assert!(a.fit.error < 1e-3);
    }
}
