//! Randomness supplied to every path generator and estimator.
//!
//! Any `rand::Rng` is a [`RandomSource`]. Reproducible runs go through the
//! seeding helpers: a base seed plus a stream index maps to an independent
//! `StdRng`, so trial `i` always sees the same draws no matter which worker
//! thread runs it.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of independent standard-normal variates.
pub trait RandomSource {
    fn standard_normal(&mut self) -> f64;

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn standard_normal(&mut self) -> f64 {
        self.sample(StandardNormal)
    }
}

#[inline]
fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of stream `stream` derived from `base`. Distinct streams give decorrelated seeds.
pub fn stream_seed(base: u64, stream: u64) -> u64 {
    splitmix64(base.wrapping_add(stream.wrapping_mul(GOLDEN_GAMMA)))
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generator for stream `stream` under base seed `base`.
pub fn stream_rng(base: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(stream_seed(base, stream))
}

/// Fresh base seed from OS entropy, used when the caller gave none.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}
