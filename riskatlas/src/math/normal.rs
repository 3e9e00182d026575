use statrs::function::erf::{erfc, erfc_inv};

#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Inverse standard-normal CDF. `p` must lie in `(0, 1)`.
#[inline]
pub fn norm_inv_cdf(p: f64) -> f64 {
    -std::f64::consts::SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_norm_cdf() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.96), 0.975_002_104_851_780, epsilon = 1e-9);
        assert_abs_diff_eq!(norm_cdf(-1.0) + norm_cdf(1.0), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_norm_inv_cdf() {
        assert_abs_diff_eq!(norm_inv_cdf(0.5), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_inv_cdf(0.01), -2.326_347_874_040_841, epsilon = 1e-9);
        assert_abs_diff_eq!(norm_inv_cdf(0.975), 1.959_963_984_540_054, epsilon = 1e-9);
        assert_abs_diff_eq!(norm_cdf(norm_inv_cdf(0.2)), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_pdf() {
        assert_abs_diff_eq!(norm_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
    }
}
