use crate::prelude::*;

/// A discretised stochastic process able to draw paths from a [`RandomSource`].
///
/// Implementors validate their parameters on construction, so generation
/// itself cannot fail.
pub trait PathGenerator: Sync {
    fn parameters(&self) -> &SimulationParameters;

    /// Draws one path of `steps + 1` points on the grid `[0, T]`.
    fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Path;

    fn terminal_value<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        self.generate(rng).terminal()
    }
}
