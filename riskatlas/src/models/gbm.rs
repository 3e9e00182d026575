//! Geometric Brownian Motion `dS = mu S dt + sigma S dW`.
//!
//! Paths are sampled through the exact log solution
//! `S_i = S_0 exp((mu - sigma^2 / 2) t_i + sigma W_i)`, so every value is
//! strictly positive and `S_0` is reproduced exactly at `t = 0`.

use crate::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct GeometricBrownianMotion {
    params: SimulationParameters,
}

impl GeometricBrownianMotion {
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;
        ensure_positive("s0", params.x0)?;
        Ok(Self { params })
    }
}

impl PathGenerator for GeometricBrownianMotion {
    fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Path {
        let p = &self.params;
        let times = p.time_grid();
        let sqrt_dt = p.dt().sqrt();
        let drift = p.drift - 0.5 * p.volatility * p.volatility;

        let mut values = Vec::with_capacity(times.len());
        values.push(p.x0);
        let mut w = 0.0;
        for &t in &times[1..] {
            w += sqrt_dt * rng.standard_normal();
            values.push(p.x0 * (drift * t + p.volatility * w).exp());
        }
        Path::new(times, values)
    }
}

/// GBM price path from `s0` over `[0, t]` in `n` steps.
pub fn simulate_gbm<R: RandomSource + ?Sized>(
    s0: f64,
    t: f64,
    n: usize,
    mu: f64,
    sigma: f64,
    rng: &mut R,
) -> Result<Path> {
    let params = SimulationParameters::new(s0, t, n)
        .with_drift(mu)
        .with_volatility(sigma);
    Ok(GeometricBrownianMotion::new(params)?.generate(rng))
}

/// Ensemble of daily price paths: `steps` periods of length one, each
/// multiplying the price by `exp((mu - sigma^2 / 2) + sigma z)`. One path per
/// aggregator trial; the ensemble's mean path is the expected price curve.
pub fn simulate_price_ensemble(
    s0: f64,
    mu: f64,
    sigma: f64,
    steps: usize,
    aggregator: &MonteCarloAggregator,
) -> Result<PathEnsemble> {
    let params = SimulationParameters::new(s0, steps as f64, steps)
        .with_drift(mu)
        .with_volatility(sigma);
    let generator = GeometricBrownianMotion::new(params)?;
    aggregator.run_paths(&generator)
}
