//! Mean-reverting Ornstein-Uhlenbeck process `dx = kappa (theta - x) dt + sigma dW`,
//! the Vasicek short-rate dynamics.
//!
//! Paths use the first-order Euler-Maruyama recurrence
//! `x_i = x_{i-1} + kappa (theta - x_{i-1}) dt + sigma sqrt(dt) z_i`.
//! Discretisation error shrinks with the step count. No floor is applied,
//! so values may turn negative.

use crate::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct OrnsteinUhlenbeck {
    params: SimulationParameters,
}

impl OrnsteinUhlenbeck {
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate_mean_reverting()?;
        Ok(Self { params })
    }

    #[inline]
    fn step(&self, x: f64, dt: f64, sqrt_dt: f64, z: f64) -> f64 {
        let p = &self.params;
        x + p.mean_reversion * (p.long_run_mean - x) * dt + p.volatility * sqrt_dt * z
    }

    /// Riemann sum `sum(x_i) * dt` over all `N + 1` points of one freshly drawn
    /// path, without materialising it. Consumes the same draws as [`PathGenerator::generate`].
    pub fn integral<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        let dt = self.params.dt();
        let sqrt_dt = dt.sqrt();
        let mut x = self.params.x0;
        let mut sum = x;
        for _ in 0..self.params.steps {
            x = self.step(x, dt, sqrt_dt, rng.standard_normal());
            sum += x;
        }
        sum * dt
    }
}

impl PathGenerator for OrnsteinUhlenbeck {
    fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Path {
        let dt = self.params.dt();
        let sqrt_dt = dt.sqrt();
        let mut values = Vec::with_capacity(self.params.steps + 1);
        let mut x = self.params.x0;
        values.push(x);
        for _ in 0..self.params.steps {
            x = self.step(x, dt, sqrt_dt, rng.standard_normal());
            values.push(x);
        }
        Path::new(self.params.time_grid(), values)
    }
}

/// Ornstein-Uhlenbeck path from zero: `n` steps of size `dt`, reversion
/// speed `theta`, long-run mean `mu`, volatility `sigma`.
pub fn simulate_ornstein_uhlenbeck<R: RandomSource + ?Sized>(
    dt: f64,
    theta: f64,
    mu: f64,
    sigma: f64,
    n: usize,
    rng: &mut R,
) -> Result<Path> {
    ensure_positive("dt", dt)?;
    ensure_count("n", n)?;
    let params = SimulationParameters::new(0.0, dt * n as f64, n)
        .with_volatility(sigma)
        .with_mean_reversion(theta, mu);
    Ok(OrnsteinUhlenbeck::new(params)?.generate(rng))
}

/// Vasicek short-rate path from `r0` over `[0, t]` in `n` steps.
pub fn simulate_vasicek<R: RandomSource + ?Sized>(
    r0: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    t: f64,
    n: usize,
    rng: &mut R,
) -> Result<Path> {
    let params = SimulationParameters::new(r0, t, n)
        .with_volatility(sigma)
        .with_mean_reversion(kappa, theta);
    Ok(OrnsteinUhlenbeck::new(params)?.generate(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_path_shape() {
        let mut rng = seeded_rng(5);
        let path = simulate_ornstein_uhlenbeck(0.1, 1.2, 0.5, 0.3, 100, &mut rng).unwrap();
        assert_eq!(path.len(), 101);
        assert_eq!(path.initial(), 0.0);

        let rates = simulate_vasicek(1.3, 0.9, 1.4, 0.05, 1.0, 100, &mut rng).unwrap();
        assert_eq!(rates.len(), 101);
        assert_eq!(rates.initial(), 1.3);
        assert_eq!(*rates.times().last().unwrap(), 1.0);
    }

    #[test]
    fn test_zero_volatility_follows_euler_recurrence() {
        let mut rng = seeded_rng(5);
        let path = simulate_vasicek(0.1, 0.5, 0.05, 0.0, 1.0, 10, &mut rng).unwrap();
        let dt = 0.1;
        let mut expected = 0.1;
        for &r in &path.values()[1..] {
            expected += 0.5 * (0.05 - expected) * dt;
            assert_abs_diff_eq!(r, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_mean_reverts_towards_long_run_level() {
        let generator = OrnsteinUhlenbeck::new(
            SimulationParameters::new(0.0, 10.0, 1000)
                .with_volatility(0.3)
                .with_mean_reversion(1.2, 0.5),
        )
        .unwrap();
        let terminals = MonteCarloAggregator::new(5000)
            .unwrap()
            .with_seed(8)
            .run_paths(&generator)
            .unwrap()
            .terminal_values()
            .unwrap();
        assert_abs_diff_eq!(terminals.mean(), 0.5, epsilon = 0.015);
        // stationary std sigma / sqrt(2 kappa)
        assert_abs_diff_eq!(terminals.std_dev(), 0.3 / (2.4_f64).sqrt(), epsilon = 0.01);
    }

    #[test]
    fn test_rates_can_go_negative() {
        let mut rng = seeded_rng(21);
        let path = simulate_vasicek(0.0, 0.1, 0.0, 0.2, 5.0, 500, &mut rng).unwrap();
        assert!(path.values().iter().any(|&r| r < 0.0));
    }

    #[test]
    fn test_integral_matches_path_sum() {
        let generator = OrnsteinUhlenbeck::new(
            SimulationParameters::new(0.5, 1.0, 200)
                .with_volatility(0.03)
                .with_mean_reversion(0.3, 0.9),
        )
        .unwrap();
        let path = generator.generate(&mut seeded_rng(4));
        let integral = generator.integral(&mut seeded_rng(4));
        assert_abs_diff_eq!(integral, path.values().iter().sum::<f64>() * 0.005, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_negative_mean_reversion() {
        let mut rng = seeded_rng(1);
        assert!(simulate_vasicek(0.05, -0.1, 0.05, 0.01, 1.0, 10, &mut rng).is_err());
        assert!(simulate_ornstein_uhlenbeck(0.1, 1.0, 0.0, -0.3, 10, &mut rng).is_err());
    }
}
