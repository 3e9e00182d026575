//! Closed-form Black-Scholes prices, used as the reference for Monte Carlo option quotes.

use crate::prelude::*;

fn d1_d2(s: f64, k: f64, r: f64, vol: f64, t: f64) -> (f64, f64) {
    let sqt = t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * vol * vol) * t) / (vol * sqt);
    (d1, d1 - vol * sqt)
}

/// Black-Scholes call price and greeks (delta, gamma, theta)
pub fn call_price_greeks(s: f64, k: f64, r: f64, vol: f64, t: f64) -> (f64, f64, f64, f64) {
    let sqt = t.sqrt();
    let (d1, d2) = d1_d2(s, k, r, vol, t);
    let df = (-r * t).exp();
    let price = s * norm_cdf(d1) - k * df * norm_cdf(d2);
    let delta = norm_cdf(d1);
    let gamma = norm_pdf(d1) / (s * vol * sqt);
    let theta = -s * norm_pdf(d1) * vol / (2.0 * sqt) - r * k * df * norm_cdf(d2);
    (price, delta, gamma, theta)
}

/// Black-Scholes price of a European option. With zero volatility the
/// price collapses to the discounted intrinsic value of the forward.
pub fn black_scholes_price(kind: OptionKind, s: f64, k: f64, r: f64, vol: f64, t: f64) -> f64 {
    let df = (-r * t).exp();
    if vol * t.sqrt() <= 0.0 {
        return match kind {
            OptionKind::Call => (s - k * df).max(0.0),
            OptionKind::Put => (k * df - s).max(0.0),
        };
    }
    let (d1, d2) = d1_d2(s, k, r, vol, t);
    match kind {
        OptionKind::Call => s * norm_cdf(d1) - k * df * norm_cdf(d2),
        OptionKind::Put => -s * norm_cdf(-d1) + k * df * norm_cdf(-d2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_prices() {
        let call = black_scholes_price(OptionKind::Call, 100.0, 100.0, 0.05, 0.2, 1.0);
        let put = black_scholes_price(OptionKind::Put, 100.0, 100.0, 0.05, 0.2, 1.0);
        assert_abs_diff_eq!(call, 10.450_583_572_185_565, epsilon = 1e-8);
        assert_abs_diff_eq!(put, 5.573_526_022_256_971, epsilon = 1e-8);
    }

    #[test]
    fn test_put_call_parity() {
        let (s, k, r, vol, t) = (95.0, 105.0, 0.03, 0.25, 0.75);
        let call = black_scholes_price(OptionKind::Call, s, k, r, vol, t);
        let put = black_scholes_price(OptionKind::Put, s, k, r, vol, t);
        assert_abs_diff_eq!(call - put, s - k * (-r * t).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_greeks_agree_with_price() {
        let (price, delta, gamma, _theta) = call_price_greeks(100.0, 100.0, 0.05, 0.2, 1.0);
        assert_abs_diff_eq!(
            price,
            black_scholes_price(OptionKind::Call, 100.0, 100.0, 0.05, 0.2, 1.0),
            epsilon = 1e-12
        );
        let h = 1e-3;
        let up = black_scholes_price(OptionKind::Call, 100.0 + h, 100.0, 0.05, 0.2, 1.0);
        let dn = black_scholes_price(OptionKind::Call, 100.0 - h, 100.0, 0.05, 0.2, 1.0);
        assert_abs_diff_eq!(delta, (up - dn) / (2.0 * h), epsilon = 1e-6);
        assert_abs_diff_eq!(gamma, (up - 2.0 * price + dn) / (h * h), epsilon = 1e-4);
    }

    #[test]
    fn test_zero_volatility() {
        let call = black_scholes_price(OptionKind::Call, 110.0, 100.0, 0.0, 0.0, 1.0);
        let put = black_scholes_price(OptionKind::Put, 110.0, 100.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(call, 10.0);
        assert_eq!(put, 0.0);
    }
}
