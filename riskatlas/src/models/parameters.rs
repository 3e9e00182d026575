use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// # SimulationParameters
/// Configuration of one discretised stochastic path.
///
/// * `x0` - value at `t = 0`
/// * `horizon` - time horizon `T`, strictly positive
/// * `steps` - number of discretisation steps `N`; paths hold `N + 1` points
/// * `drift` - drift `mu` (GBM)
/// * `volatility` - diffusion coefficient `sigma`, non-negative
/// * `mean_reversion` - reversion speed `kappa` (Ornstein-Uhlenbeck/Vasicek), non-negative
/// * `long_run_mean` - level `theta` the mean-reverting process is pulled towards
///
/// ## Example
/// ```
/// use riskatlas::prelude::*;
///
/// let params = SimulationParameters::new(100.0, 1.0, 4)
///     .with_drift(0.05)
///     .with_volatility(0.2);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.dt(), 0.25);
/// assert_eq!(params.time_grid(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
    pub x0: f64,
    pub horizon: f64,
    pub steps: usize,
    #[serde(default)]
    pub drift: f64,
    #[serde(default)]
    pub volatility: f64,
    #[serde(default)]
    pub mean_reversion: f64,
    #[serde(default)]
    pub long_run_mean: f64,
}

impl SimulationParameters {
    pub fn new(x0: f64, horizon: f64, steps: usize) -> Self {
        Self {
            x0,
            horizon,
            steps,
            drift: 0.0,
            volatility: 0.0,
            mean_reversion: 0.0,
            long_run_mean: 0.0,
        }
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_mean_reversion(mut self, kappa: f64, theta: f64) -> Self {
        self.mean_reversion = kappa;
        self.long_run_mean = theta;
        self
    }

    pub fn dt(&self) -> f64 {
        self.horizon / self.steps as f64
    }

    /// Evenly spaced grid `t_i = i * dt`, `i = 0..=N`, with `t_N = T` exactly.
    pub fn time_grid(&self) -> Vec<f64> {
        let dt = self.dt();
        let mut grid: Vec<f64> = (0..=self.steps).map(|i| i as f64 * dt).collect();
        if let Some(last) = grid.last_mut() {
            *last = self.horizon;
        }
        grid
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("x0", self.x0)?;
        ensure_positive("horizon", self.horizon)?;
        ensure_count("steps", self.steps)?;
        ensure_finite("drift", self.drift)?;
        ensure_non_negative("volatility", self.volatility)?;
        Ok(())
    }

    pub fn validate_mean_reverting(&self) -> Result<()> {
        self.validate()?;
        ensure_non_negative("mean_reversion", self.mean_reversion)?;
        ensure_finite("long_run_mean", self.long_run_mean)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_configuration() {
        let base = SimulationParameters::new(1.0, 1.0, 10);
        assert!(base.validate().is_ok());
        assert!(base.with_volatility(-0.1).validate().is_err());
        assert!(SimulationParameters::new(1.0, 0.0, 10).validate().is_err());
        assert!(SimulationParameters::new(1.0, -1.0, 10).validate().is_err());
        assert!(SimulationParameters::new(1.0, 1.0, 0).validate().is_err());
        assert!(SimulationParameters::new(f64::NAN, 1.0, 1).validate().is_err());
        assert!(base
            .with_mean_reversion(-0.5, 0.1)
            .validate_mean_reverting()
            .is_err());
        assert!(base.with_mean_reversion(0.0, 0.1).validate_mean_reverting().is_ok());
    }

    #[test]
    fn test_time_grid_spans_horizon() {
        let params = SimulationParameters::new(0.0, 2.0, 3);
        let grid = params.time_grid();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], 0.0);
        assert_eq!(*grid.last().unwrap(), 2.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{"x0": 0.5, "horizon": 1.0, "steps": 200}"#).unwrap();
        assert_eq!(params, SimulationParameters::new(0.5, 1.0, 200));
    }
}
