use serde::{Deserialize, Serialize};

use crate::{diis::DiisConfig, error::ScfError, hf::InitialGuess};

/// Settings of one SCF run. Every field has a default, so a config file only needs to
/// name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfConfig {
    /// hard cap on the number of iterations
    pub max_iterations: usize,
    /// the run is converged once the total energy changes by less than this between two
    /// iterations
    pub energy_tolerance: f64,
    pub use_diis: bool,
    pub diis: DiisConfig,
    /// DIIS settings of the beta channel in unrestricted runs. Falls back to `diis`.
    pub beta_diis: Option<DiisConfig>,
    pub initial_guess: InitialGuess,
    /// log every iteration at info level instead of debug level
    pub verbose: bool,
}

impl Default for ScfConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            energy_tolerance: 1e-6,
            use_diis: true,
            diis: DiisConfig::default(),
            beta_diis: None,
            initial_guess: InitialGuess::default(),
            verbose: false,
        }
    }
}

impl ScfConfig {
    pub fn validate(&self) -> Result<(), ScfError> {
        if self.max_iterations == 0 {
            return Err(ScfError::InvalidConfig(
                "max_iterations must be at least 1".to_owned(),
            ));
        }
        if !(self.energy_tolerance.is_finite() && self.energy_tolerance >= 0.0) {
            return Err(ScfError::InvalidConfig(format!(
                "energy_tolerance must be a finite, non-negative number, got {}",
                self.energy_tolerance
            )));
        }
        for diis in std::iter::once(&self.diis).chain(&self.beta_diis) {
            if diis.capacity == 0 {
                return Err(ScfError::InvalidConfig(
                    "DIIS capacity must be at least 1".to_owned(),
                ));
            }
        }
        Ok(())
    }

    pub fn beta_diis(&self) -> &DiisConfig {
        self.beta_diis.as_ref().unwrap_or(&self.diis)
    }
}
