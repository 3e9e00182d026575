//! Order-insensitive reductions over samples.

use crate::prelude::*;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`n - 1` denominator). Zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Sample covariance of two equally long samples.
pub fn covariance(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(RiskAtlasError::InvalidParameter(format!(
            "covariance needs equal lengths, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Ok(0.0);
    }
    let mx = mean(x);
    let my = mean(y);
    let s: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Ok(s / (n - 1) as f64)
}

/// Percentile of an ascending slice, `percent` in `[0, 100]`, with linear
/// interpolation between the two closest ranks.
pub fn percentile_sorted(sorted: &[f64], percent: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(RiskAtlasError::InvalidParameter(format!(
            "percentile must be in [0, 100], got {percent}"
        )));
    }
    if sorted.is_empty() {
        return Err(RiskAtlasError::InvalidParameter(
            "percentile of an empty sample".to_string(),
        ));
    }
    let rank = percent / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let w = rank - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * w)
}
