//! Monte Carlo pricing of European calls and puts.
//!
//! Only the terminal price matters for a European payoff, so each trial
//! samples it in one step from the exact GBM terminal law
//! `S_T = S_0 exp((r - sigma^2 / 2) T + sigma sqrt(T) Z)`; no intermediate path
//! is built. The discounted average payoff converges to the Black-Scholes
//! price at rate `O(1 / sqrt(iterations))`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prelude::*;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    #[inline]
    pub fn payoff(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (spot - strike).max(0.0),
            OptionKind::Put => (strike - spot).max(0.0),
        }
    }
}

/// # OptionParameters
/// Contract and market inputs of a European option.
///
/// * `spot` - `S0`
/// * `strike` - exercise price `E`
/// * `maturity` - time to expiry `T` in years
/// * `rate` - continuously compounded risk-free rate `rf`
/// * `volatility` - annualised `sigma`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct OptionParameters {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub volatility: f64,
    pub kind: OptionKind,
}

impl OptionParameters {
    pub fn new(
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        volatility: f64,
        kind: OptionKind,
    ) -> Self {
        Self {
            spot,
            strike,
            maturity,
            rate,
            volatility,
            kind,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("strike", self.strike)?;
        ensure_positive("maturity", self.maturity)?;
        ensure_finite("rate", self.rate)?;
        ensure_non_negative("volatility", self.volatility)?;
        Ok(())
    }

    /// Terminal spot for a standard-normal draw `z`.
    #[inline]
    pub fn terminal_spot(&self, z: f64) -> f64 {
        let t = self.maturity;
        let vol = self.volatility;
        self.spot * ((self.rate - 0.5 * vol * vol) * t + vol * t.sqrt() * z).exp()
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    pub fn black_scholes_price(&self) -> f64 {
        black_scholes_price(
            self.kind,
            self.spot,
            self.strike,
            self.rate,
            self.volatility,
            self.maturity,
        )
    }
}

/// Present value of an option plus the inputs and sample size it came from.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct OptionQuote {
    pub price: f64,
    pub standard_error: f64,
    pub iterations: usize,
    pub parameters: OptionParameters,
}

impl OptionQuote {
    /// Monte Carlo price minus the closed-form Black-Scholes price.
    pub fn black_scholes_difference(&self) -> f64 {
        self.price - self.parameters.black_scholes_price()
    }
}

pub fn price_option(
    params: &OptionParameters,
    aggregator: &MonteCarloAggregator,
) -> Result<OptionQuote> {
    params.validate()?;
    let p = *params;
    let payoffs =
        aggregator.run_terminal(|rng| p.kind.payoff(p.terminal_spot(rng.standard_normal()), p.strike))?;
    let df = p.discount_factor();
    let quote = OptionQuote {
        price: df * payoffs.mean(),
        standard_error: df * payoffs.standard_error(),
        iterations: payoffs.len(),
        parameters: p,
    };
    info!(
        kind = ?p.kind,
        price = quote.price,
        standard_error = quote.standard_error,
        iterations = quote.iterations,
        "priced option by Monte Carlo"
    );
    Ok(quote)
}

/// Present value of a European `kind` option by Monte Carlo.
#[allow(clippy::too_many_arguments)]
pub fn price_option_monte_carlo(
    s0: f64,
    strike: f64,
    t: f64,
    rf: f64,
    sigma: f64,
    iterations: usize,
    kind: OptionKind,
    config: &SimulationConfig,
) -> Result<f64> {
    let params = OptionParameters::new(s0, strike, t, rf, sigma, kind);
    params.validate()?;
    let aggregator = MonteCarloAggregator::from_config(iterations, config)?;
    Ok(price_option(&params, &aggregator)?.price)
}
