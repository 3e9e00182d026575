use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Vasicek short-rate model `dr = kappa (theta - r) dt + sigma dW`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct VasicekModel {
    pub r0: f64,
    pub kappa: f64,
    pub theta: f64,
    pub sigma: f64,
}

impl VasicekModel {
    pub fn new(r0: f64, kappa: f64, theta: f64, sigma: f64) -> Result<Self> {
        let model = Self {
            r0,
            kappa,
            theta,
            sigma,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("r0", self.r0)?;
        ensure_non_negative("kappa", self.kappa)?;
        ensure_finite("theta", self.theta)?;
        ensure_non_negative("sigma", self.sigma)?;
        Ok(())
    }

    pub fn parameters(&self, maturity: f64, steps: usize) -> SimulationParameters {
        SimulationParameters::new(self.r0, maturity, steps)
            .with_volatility(self.sigma)
            .with_mean_reversion(self.kappa, self.theta)
    }

    /// Euler-Maruyama path generator over `[0, maturity]`.
    pub fn path_generator(&self, maturity: f64, steps: usize) -> Result<OrnsteinUhlenbeck> {
        OrnsteinUhlenbeck::new(self.parameters(maturity, steps))
    }

    /// `E[r_t] = theta + (r0 - theta) e^{-kappa t}`
    pub fn expected_rate(&self, t: f64) -> f64 {
        self.theta + (self.r0 - self.theta) * (-self.kappa * t).exp()
    }

    pub fn rate_variance(&self, t: f64) -> f64 {
        let s2 = self.sigma * self.sigma;
        if self.kappa.abs() <= 1.0e-12 {
            s2 * t
        } else {
            s2 / (2.0 * self.kappa) * (1.0 - (-2.0 * self.kappa * t).exp())
        }
    }

    fn bond_b(&self, tau: f64) -> f64 {
        if tau <= 0.0 {
            0.0
        } else if self.kappa.abs() <= 1.0e-12 {
            tau
        } else {
            (1.0 - (-self.kappa * tau).exp()) / self.kappa
        }
    }

    /// Closed-form zero-coupon bond price `P(0, T) = exp(A - B r0)` per unit face value.
    pub fn zero_coupon_bond_price(&self, maturity: f64) -> f64 {
        if maturity <= 0.0 {
            return 1.0;
        }
        let b = self.bond_b(maturity);
        let s2 = self.sigma * self.sigma;
        let ln_a = if self.kappa.abs() <= 1.0e-12 {
            // kappa -> 0 limit: Gaussian integral of a driftless rate
            s2 * maturity.powi(3) / 6.0
        } else {
            (self.theta - s2 / (2.0 * self.kappa * self.kappa)) * (b - maturity)
                - s2 * b * b / (4.0 * self.kappa)
        };
        (ln_a - b * self.r0).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_closed_form_reference_value() {
        let model = VasicekModel::new(0.5, 0.3, 0.9, 0.03).unwrap();
        assert_abs_diff_eq!(model.zero_coupon_bond_price(1.0), 0.574_45, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_volatility_bond_discounts_deterministic_rate() {
        let model = VasicekModel::new(0.05, 0.0, 0.05, 0.0).unwrap();
        assert_abs_diff_eq!(
            model.zero_coupon_bond_price(2.0),
            (-0.05_f64 * 2.0).exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_price_decreases_with_r0() {
        let low = VasicekModel::new(0.02, 0.3, 0.05, 0.01).unwrap();
        let high = VasicekModel::new(0.04, 0.3, 0.05, 0.01).unwrap();
        assert!(high.zero_coupon_bond_price(5.0) < low.zero_coupon_bond_price(5.0));
    }

    #[test]
    fn test_simulated_rate_moments() {
        let model = VasicekModel::new(0.5, 0.3, 0.9, 0.03).unwrap();
        let generator = model.path_generator(1.0, 200).unwrap();
        let terminals = MonteCarloAggregator::new(20_000)
            .unwrap()
            .with_seed(12)
            .run_paths(&generator)
            .unwrap()
            .terminal_values()
            .unwrap();
        assert_abs_diff_eq!(terminals.mean(), model.expected_rate(1.0), epsilon = 1e-3);
        assert_abs_diff_eq!(
            terminals.std_dev(),
            model.rate_variance(1.0).sqrt(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_rejects_invalid_model() {
        assert!(VasicekModel::new(0.05, -0.3, 0.05, 0.01).is_err());
        assert!(VasicekModel::new(0.05, 0.3, 0.05, -0.01).is_err());
    }
}
