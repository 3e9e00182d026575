use crate::prelude::*;

/// Standard Wiener process started at `x0`: `x_i = x_{i-1} + sqrt(dt) * z_i`.
/// Drift and volatility in the parameters are ignored.
#[derive(Clone, Copy, Debug)]
pub struct WienerProcess {
    params: SimulationParameters,
}

impl WienerProcess {
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl PathGenerator for WienerProcess {
    fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Path {
        let sd = self.params.dt().sqrt();
        let mut values = Vec::with_capacity(self.params.steps + 1);
        let mut x = self.params.x0;
        values.push(x);
        for _ in 0..self.params.steps {
            x += sd * rng.standard_normal();
            values.push(x);
        }
        Path::new(self.params.time_grid(), values)
    }
}

/// Wiener path of `n` increments of size `dt` starting at `x0`.
pub fn simulate_wiener<R: RandomSource + ?Sized>(
    dt: f64,
    x0: f64,
    n: usize,
    rng: &mut R,
) -> Result<Path> {
    ensure_positive("dt", dt)?;
    ensure_count("n", n)?;
    let generator = WienerProcess::new(SimulationParameters::new(x0, dt * n as f64, n))?;
    Ok(generator.generate(rng))
}
