//! Portfolio aggregation for mean-variance statistics and portfolio VaR.
//!
//! Per-asset means and the covariance matrix collapse into one portfolio
//! `mu = w . m` and `sigma = sqrt(w' C w)`; correlation enters only through the
//! covariance matrix, never through correlated Monte Carlo draws.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::prelude::*;

/// Tolerance on `sum(weights) == 1`.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Excess return per unit volatility. A zero or non-finite volatility yields
/// the sentinel `0.0` instead of a division by zero.
pub fn sharpe_ratio(expected_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility > 0.0 && volatility.is_finite() {
        (expected_return - risk_free_rate) / volatility
    } else {
        warn!(volatility, "Sharpe ratio undefined for zero volatility, reporting 0");
        0.0
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct PortfolioStatistics {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PortfolioCandidate {
    pub weights: Vec<f64>,
    pub statistics: PortfolioStatistics,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AssetVar {
    pub symbol: String,
    pub weight: f64,
    pub estimate: RiskEstimate,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PortfolioVarReport {
    pub mean: f64,
    pub volatility: f64,
    pub portfolio: VarComparison,
    pub individual: Vec<AssetVar>,
}

/// # PortfolioModel
/// Per-period means and covariance of a set of assets.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PortfolioModel {
    symbols: Vec<String>,
    means: Vec<f64>,
    covariance: Vec<Vec<f64>>,
}

impl PortfolioModel {
    pub fn new(symbols: Vec<String>, means: Vec<f64>, covariance: Vec<Vec<f64>>) -> Result<Self> {
        let n = symbols.len();
        if n == 0 {
            return Err(RiskAtlasError::InvalidParameter(
                "a portfolio needs at least one asset".to_string(),
            ));
        }
        if means.len() != n || covariance.len() != n || covariance.iter().any(|row| row.len() != n)
        {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "expected {n} means and a {n}x{n} covariance matrix"
            )));
        }
        for (i, row) in covariance.iter().enumerate() {
            ensure_finite("mean", means[i])?;
            ensure_non_negative("variance", row[i])?;
            for (j, &c) in row.iter().enumerate() {
                ensure_finite("covariance", c)?;
                let scale = c.abs().max(covariance[j][i].abs()).max(1.0);
                if (c - covariance[j][i]).abs() > 1e-12 * scale {
                    return Err(RiskAtlasError::InvalidParameter(
                        "covariance matrix must be symmetric".to_string(),
                    ));
                }
            }
        }
        Ok(Self {
            symbols,
            means,
            covariance,
        })
    }

    pub fn from_returns(returns: &ReturnMatrix) -> Result<Self> {
        Self::new(
            returns.symbols().to_vec(),
            returns.means(),
            returns.covariance()?,
        )
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    pub fn validate_weights(&self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.len() {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "{} weights given for {} assets",
                weights.len(),
                self.len()
            )));
        }
        for &w in weights {
            ensure_finite("weight", w)?;
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "weights must sum to 1, got {total}"
            )));
        }
        Ok(())
    }

    /// Per-period portfolio mean and standard deviation.
    pub fn moments(&self, weights: &[f64]) -> Result<(f64, f64)> {
        self.validate_weights(weights)?;
        let mu: f64 = weights.iter().zip(&self.means).map(|(w, m)| w * m).sum();
        let mut variance: f64 = 0.0;
        for (i, row) in self.covariance.iter().enumerate() {
            for (j, c) in row.iter().enumerate() {
                variance += weights[i] * c * weights[j];
            }
        }
        Ok((mu, variance.max(0.0).sqrt()))
    }

    /// Annualised expected return, volatility and Sharpe ratio (zero risk-free rate).
    pub fn statistics(&self, weights: &[f64], periods_per_year: f64) -> Result<PortfolioStatistics> {
        ensure_positive("periods_per_year", periods_per_year)?;
        let (mu, sigma) = self.moments(weights)?;
        let expected_return = mu * periods_per_year;
        let volatility = sigma * periods_per_year.sqrt();
        Ok(PortfolioStatistics {
            expected_return,
            volatility,
            sharpe_ratio: sharpe_ratio(expected_return, volatility, 0.0),
        })
    }

    /// VaR of a single asset holding `position`.
    pub fn asset_var_parameters(
        &self,
        asset: usize,
        position: f64,
        confidence: f64,
        days: u32,
    ) -> Result<VarParameters> {
        if asset >= self.len() {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "asset index {asset} out of range"
            )));
        }
        let params = VarParameters::new(
            position,
            self.means[asset],
            self.covariance[asset][asset].sqrt(),
            confidence,
            days,
        );
        params.validate()?;
        Ok(params)
    }

    pub fn var_parameters(
        &self,
        weights: &[f64],
        position: f64,
        confidence: f64,
        days: u32,
    ) -> Result<VarParameters> {
        let (mu, sigma) = self.moments(weights)?;
        let params = VarParameters::new(position, mu, sigma, confidence, days);
        params.validate()?;
        Ok(params)
    }

    /// Portfolio VaR by both methods, plus the analytical VaR of each
    /// weighted holding on its own. Long-only weights are expected for the
    /// per-asset figures; an asset with zero weight is skipped.
    pub fn portfolio_var(
        &self,
        weights: &[f64],
        position: f64,
        confidence: f64,
        days: u32,
        aggregator: &MonteCarloAggregator,
    ) -> Result<PortfolioVarReport> {
        let params = self.var_parameters(weights, position, confidence, days)?;
        let portfolio = compare_var(&params, aggregator)?;

        let mut individual = Vec::with_capacity(self.len());
        for (i, &w) in weights.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let asset = self.asset_var_parameters(i, (w * position).abs(), confidence, days)?;
            individual.push(AssetVar {
                symbol: self.symbols[i].clone(),
                weight: w,
                estimate: analytical_var(&asset)?,
            });
        }
        info!(
            assets = self.len(),
            analytical = portfolio.analytical.loss,
            monte_carlo = portfolio.monte_carlo.loss,
            "portfolio VaR"
        );
        Ok(PortfolioVarReport {
            mean: params.mu,
            volatility: params.sigma,
            portfolio,
            individual,
        })
    }

    /// One random long-only portfolio per aggregator trial: uniform draws
    /// normalised to sum to one.
    pub fn random_portfolios(
        &self,
        periods_per_year: f64,
        aggregator: &MonteCarloAggregator,
    ) -> Result<Vec<PortfolioCandidate>> {
        ensure_positive("periods_per_year", periods_per_year)?;
        let n = self.len();
        let draws = aggregator.run(|rng| {
            let raw: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() + f64::EPSILON).collect();
            let total: f64 = raw.iter().sum();
            raw.into_iter().map(|x| x / total).collect::<Vec<f64>>()
        })?;
        draws
            .into_iter()
            .map(|weights| {
                let statistics = self.statistics(&weights, periods_per_year)?;
                Ok(PortfolioCandidate {
                    weights,
                    statistics,
                })
            })
            .collect()
    }

    /// Long-only weights maximising the Sharpe ratio (zero risk-free rate).
    ///
    /// Nelder-Mead searches over `n - 1` softmax logits with the last one pinned at zero,
    /// so every point it visits is a valid weight vector.
    pub fn optimize_max_sharpe(
        &self,
        periods_per_year: f64,
        max_iters: u64,
    ) -> Result<PortfolioCandidate> {
        ensure_positive("periods_per_year", periods_per_year)?;
        if self.len() == 1 {
            let weights = vec![1.0];
            let statistics = self.statistics(&weights, periods_per_year)?;
            return Ok(PortfolioCandidate {
                weights,
                statistics,
            });
        }
        let dim = self.len() - 1;
        let mut simplex = vec![vec![0.0; dim]];
        for i in 0..dim {
            let mut vertex = vec![0.0; dim];
            vertex[i] = 1.0;
            simplex.push(vertex);
        }
        let cost = NegativeSharpe {
            model: self.clone(),
            periods_per_year,
        };
        let solver = NelderMead::new(simplex).with_sd_tolerance(1e-12)?;
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()?;
        let logits = result
            .state()
            .get_best_param()
            .cloned()
            .ok_or_else(|| RiskAtlasError::Optimization("no best parameter".to_string()))?;
        let weights = softmax_weights(&logits);
        let statistics = self.statistics(&weights, periods_per_year)?;
        info!(
            sharpe_ratio = statistics.sharpe_ratio,
            iterations = result.state().get_iter(),
            "max Sharpe portfolio optimised"
        );
        Ok(PortfolioCandidate {
            weights,
            statistics,
        })
    }
}

struct NegativeSharpe {
    model: PortfolioModel,
    periods_per_year: f64,
}

impl CostFunction for NegativeSharpe {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, logits: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        let weights = softmax_weights(logits);
        let statistics = self.model.statistics(&weights, self.periods_per_year)?;
        Ok(-statistics.sharpe_ratio)
    }
}

/// Weights from free logits plus an implicit trailing zero logit.
fn softmax_weights(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(0.0_f64, f64::max);
    let exps: Vec<f64> = logits
        .iter()
        .chain(std::iter::once(&0.0))
        .map(|x| (x - max).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|x| x / total).collect()
}

/// Candidate with the highest Sharpe ratio.
pub fn max_sharpe_portfolio(candidates: &[PortfolioCandidate]) -> Option<&PortfolioCandidate> {
    candidates
        .iter()
        .max_by(|a, b| a.statistics.sharpe_ratio.total_cmp(&b.statistics.sharpe_ratio))
}
