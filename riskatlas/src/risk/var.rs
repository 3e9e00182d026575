//! Value-at-Risk of a single position, analytically and by Monte Carlo.
//!
//! Both estimators are reported as unsigned loss magnitudes: the signed
//! figure behind each estimate is kept in [`RiskEstimate::signed_value`].
//!
//! * Analytical: `position * (mu n - z_{1-c} sigma sqrt(n))` with
//!   `z_{1-c}` the `(1 - c)` quantile of the standard normal.
//! * Monte Carlo: terminal values `S exp((mu - sigma^2 / 2) n + sigma sqrt(n) Z)`,
//!   loss `S - P_{(1-c)}` where `P_{(1-c)}` is the `(1 - c) * 100`-th percentile.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prelude::*;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VarMethod {
    Analytical,
    MonteCarlo,
}

/// # VarParameters
/// * `position` - current value of the position
/// * `mu` - expected per-period (daily) return
/// * `sigma` - per-period standard deviation of returns
/// * `confidence` - confidence level `c` in `(0, 1)`
/// * `days` - horizon `n` in periods, at least one
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct VarParameters {
    pub position: f64,
    pub mu: f64,
    pub sigma: f64,
    pub confidence: f64,
    pub days: u32,
}

impl VarParameters {
    pub fn new(position: f64, mu: f64, sigma: f64, confidence: f64, days: u32) -> Self {
        Self {
            position,
            mu,
            sigma,
            confidence,
            days,
        }
    }

    /// Drift and volatility estimated from a historical return series.
    pub fn from_returns(
        position: f64,
        returns: &ReturnSeries,
        confidence: f64,
        days: u32,
    ) -> Result<Self> {
        let params = Self::new(position, returns.mean(), returns.std_dev(), confidence, days);
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("position", self.position)?;
        ensure_finite("mu", self.mu)?;
        ensure_non_negative("sigma", self.sigma)?;
        ensure_confidence(self.confidence)?;
        if self.days == 0 {
            return Err(RiskAtlasError::InvalidParameter(
                "days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    fn terminal_value(&self, z: f64) -> f64 {
        let n = self.days as f64;
        self.position
            * ((self.mu - 0.5 * self.sigma * self.sigma) * n + self.sigma * n.sqrt() * z).exp()
    }
}

/// Outcome of one VaR computation.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct RiskEstimate {
    pub position: f64,
    pub confidence: f64,
    pub horizon_days: u32,
    /// Unsigned loss magnitude.
    pub loss: f64,
    pub signed_value: f64,
    pub method: VarMethod,
}

impl RiskEstimate {
    fn new(params: &VarParameters, signed_value: f64, method: VarMethod) -> Self {
        Self {
            position: params.position,
            confidence: params.confidence,
            horizon_days: params.days,
            loss: signed_value.abs(),
            signed_value,
            method,
        }
    }
}

/// Analytical and Monte Carlo estimates of one position side by side.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct VarComparison {
    pub analytical: RiskEstimate,
    pub monte_carlo: RiskEstimate,
    /// `analytical.loss - monte_carlo.loss`
    pub difference: f64,
}

pub fn analytical_var(params: &VarParameters) -> Result<RiskEstimate> {
    params.validate()?;
    let n = params.days as f64;
    let z = norm_inv_cdf(1.0 - params.confidence);
    let signed = params.position * (params.mu * n - z * params.sigma * n.sqrt());
    let estimate = RiskEstimate::new(params, signed, VarMethod::Analytical);
    info!(
        loss = estimate.loss,
        confidence = params.confidence,
        days = params.days,
        "analytical VaR"
    );
    Ok(estimate)
}

pub fn monte_carlo_var(
    params: &VarParameters,
    aggregator: &MonteCarloAggregator,
) -> Result<RiskEstimate> {
    params.validate()?;
    let p = *params;
    let values = aggregator.run_terminal(|rng| p.terminal_value(rng.standard_normal()))?;
    let cutoff = values.percentile((1.0 - p.confidence) * 100.0)?;
    let estimate = RiskEstimate::new(params, p.position - cutoff, VarMethod::MonteCarlo);
    info!(
        loss = estimate.loss,
        confidence = p.confidence,
        days = p.days,
        iterations = values.len(),
        "Monte Carlo VaR"
    );
    Ok(estimate)
}

pub fn compare_var(
    params: &VarParameters,
    aggregator: &MonteCarloAggregator,
) -> Result<VarComparison> {
    let analytical = analytical_var(params)?;
    let monte_carlo = monte_carlo_var(params, aggregator)?;
    Ok(VarComparison {
        analytical,
        monte_carlo,
        difference: analytical.loss - monte_carlo.loss,
    })
}

/// Analytical VaR as an unsigned loss magnitude.
pub fn value_at_risk_analytical(
    position: f64,
    confidence: f64,
    mu: f64,
    sigma: f64,
    days: u32,
) -> Result<f64> {
    Ok(analytical_var(&VarParameters::new(position, mu, sigma, confidence, days))?.loss)
}

/// Monte Carlo VaR as an unsigned loss magnitude.
pub fn value_at_risk_monte_carlo(
    position: f64,
    mu: f64,
    sigma: f64,
    confidence: f64,
    days: u32,
    iterations: usize,
    config: &SimulationConfig,
) -> Result<f64> {
    let params = VarParameters::new(position, mu, sigma, confidence, days);
    params.validate()?;
    let aggregator = MonteCarloAggregator::from_config(iterations, config)?;
    Ok(monte_carlo_var(&params, &aggregator)?.loss)
}
