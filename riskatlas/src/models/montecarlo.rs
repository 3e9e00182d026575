//! Monte Carlo aggregation: run `M` independent trials and reduce the ensemble.
//!
//! Every trial owns a generator seeded from `stream_seed(base, trial)`, so no
//! random stream is ever shared between trials or threads and a seeded run
//! gives the same ensemble sequentially, in parallel, or on any pool size.

use rand::rngs::StdRng;
use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::prelude::*;

/// Summary of an ensemble of scalar outcomes.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct EnsembleStatistics {
    pub trials: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub standard_error: f64,
    pub min: f64,
    pub max: f64,
}

/// # Ensemble
/// Scalar outcomes of `M` independent trials, kept in trial order.
#[derive(Serialize, Clone, Debug)]
pub struct Ensemble {
    values: Vec<f64>,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl Ensemble {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(RiskAtlasError::InvalidParameter(
                "an ensemble needs at least one value".to_string(),
            ));
        }
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Ok(Self { values, sorted })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.values)
    }

    /// Sample standard deviation; zero for a single trial.
    pub fn std_dev(&self) -> f64 {
        std_dev(&self.values)
    }

    pub fn standard_error(&self) -> f64 {
        self.std_dev() / (self.len() as f64).sqrt()
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Percentile with `percent` in `[0, 100]`.
    pub fn percentile(&self, percent: f64) -> Result<f64> {
        percentile_sorted(&self.sorted, percent)
    }

    pub fn statistics(&self) -> EnsembleStatistics {
        EnsembleStatistics {
            trials: self.len(),
            mean: self.mean(),
            std_dev: self.std_dev(),
            standard_error: self.standard_error(),
            min: self.min(),
            max: self.max(),
        }
    }
}

/// Full paths of `M` independent trials sharing one time grid.
#[derive(Serialize, Clone, Debug)]
pub struct PathEnsemble {
    paths: Vec<Path>,
}

impl PathEnsemble {
    pub fn new(paths: Vec<Path>) -> Result<Self> {
        let Some(first) = paths.first() else {
            return Err(RiskAtlasError::InvalidParameter(
                "a path ensemble needs at least one path".to_string(),
            ));
        };
        let len = first.len();
        if paths.iter().any(|p| p.len() != len) {
            return Err(RiskAtlasError::InvalidParameter(
                "paths in an ensemble must share one time grid".to_string(),
            ));
        }
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Cross-section of all paths at grid index `step`.
    pub fn values_at(&self, step: usize) -> Result<Ensemble> {
        if step >= self.paths[0].len() {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "step {step} is outside a grid of {} points",
                self.paths[0].len()
            )));
        }
        Ensemble::new(self.paths.iter().map(|p| p.values()[step]).collect())
    }

    pub fn terminal_values(&self) -> Result<Ensemble> {
        Ensemble::new(self.paths.iter().map(|p| p.terminal()).collect())
    }

    /// Pointwise average over all paths.
    pub fn mean_path(&self) -> Path {
        let first = &self.paths[0];
        let n = self.paths.len() as f64;
        let mut sums = vec![0.0; first.len()];
        for path in &self.paths {
            for (acc, x) in sums.iter_mut().zip(path.values()) {
                *acc += x;
            }
        }
        Path::new(
            first.times().to_vec(),
            sums.into_iter().map(|s| s / n).collect(),
        )
    }
}

/// # MonteCarloAggregator
/// Executes a trial function `trials` times with independent randomness.
///
/// ## Example
/// ```
/// use riskatlas::prelude::*;
///
/// let aggregator = MonteCarloAggregator::new(1_000).unwrap().with_seed(42);
/// let ensemble = aggregator.run_terminal(|rng| rng.standard_normal()).unwrap();
/// assert_eq!(ensemble.len(), 1_000);
/// assert!(ensemble.mean().abs() < 0.2);
/// ```
#[derive(Clone, Debug)]
pub struct MonteCarloAggregator {
    trials: usize,
    config: SimulationConfig,
    cancel: Option<CancellationToken>,
}

impl MonteCarloAggregator {
    pub fn new(trials: usize) -> Result<Self> {
        Self::from_config(trials, &SimulationConfig::default())
    }

    pub fn from_config(trials: usize, config: &SimulationConfig) -> Result<Self> {
        ensure_count("trials", trials)?;
        config.validate()?;
        Ok(Self {
            trials,
            config: *config,
            cancel: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.config.num_threads = Some(num_threads.max(1));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs `trial` once per trial index and returns the outcomes in trial order.
    pub fn run<T, F>(&self, trial: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&mut StdRng) -> T + Sync + Send,
    {
        let base = self.config.seed.unwrap_or_else(entropy_seed);
        debug!(
            trials = self.trials,
            parallel = self.config.parallel,
            seed = base,
            "starting Monte Carlo run"
        );
        let cancel = self.cancel.as_ref();
        let one = |i: usize| -> Result<T> {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                return Err(RiskAtlasError::Cancelled);
            }
            let mut rng = stream_rng(base, i as u64);
            Ok(trial(&mut rng))
        };

        if !self.config.parallel {
            return (0..self.trials).map(one).collect();
        }
        match self.config.num_threads {
            Some(n) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("riskatlas-mc-{}", i))
                    .build()?;
                pool.install(|| (0..self.trials).into_par_iter().map(one).collect())
            }
            None => (0..self.trials).into_par_iter().map(one).collect(),
        }
    }

    /// Runs a scalar-valued trial and wraps the outcomes in an [`Ensemble`].
    pub fn run_terminal<F>(&self, trial: F) -> Result<Ensemble>
    where
        F: Fn(&mut StdRng) -> f64 + Sync + Send,
    {
        let ensemble = Ensemble::new(self.run(trial)?)?;
        if ensemble.len() > 1 && ensemble.std_dev() == 0.0 {
            warn!(trials = ensemble.len(), "degenerate ensemble with zero variance");
        }
        Ok(ensemble)
    }

    /// Draws one full path per trial.
    pub fn run_paths<G: PathGenerator>(&self, generator: &G) -> Result<PathEnsemble> {
        PathEnsemble::new(self.run(|rng| generator.generate(rng))?)
    }
}
