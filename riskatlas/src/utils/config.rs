use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

fn default_parallel() -> bool {
    true
}

/// # SimulationConfig
/// Run-time settings shared by every Monte Carlo estimator.
///
/// * `seed` - base seed; trial `i` draws from `stream_seed(seed, i)`. `None` seeds from OS entropy.
/// * `parallel` - distribute trials over rayon workers.
/// * `num_threads` - size of a dedicated worker pool. `None` uses the global rayon pool.
///
/// ## Example
/// ```
/// use riskatlas::prelude::*;
///
/// let config = SimulationConfig::from_json_str(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert!(config.parallel);
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: default_parallel(),
            num_threads: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.num_threads {
            return Err(RiskAtlasError::Config(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
