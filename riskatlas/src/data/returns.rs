use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::prelude::*;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Crypto markets trade every calendar day.
pub const CRYPTO_DAYS_PER_YEAR: f64 = 365.0;

/// Dated per-period returns of one symbol.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReturnSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(symbol: String, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self {
            symbol,
            dates,
            values,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.values)
    }

    /// Sample standard deviation of the returns.
    pub fn std_dev(&self) -> f64 {
        std_dev(&self.values)
    }

    pub fn annualized_mean(&self, periods_per_year: f64) -> f64 {
        self.mean() * periods_per_year
    }

    pub fn annualized_volatility(&self, periods_per_year: f64) -> f64 {
        self.std_dev() * periods_per_year.sqrt()
    }
}

/// Returns of several symbols restricted to the dates all of them share.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReturnMatrix {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    pub fn align(series: &[ReturnSeries]) -> Result<Self> {
        let Some(first) = series.first() else {
            return Err(RiskAtlasError::InvalidParameter(
                "no return series to align".to_string(),
            ));
        };
        let mut common: BTreeSet<NaiveDate> = first.dates.iter().copied().collect();
        for s in &series[1..] {
            let dates: BTreeSet<NaiveDate> = s.dates.iter().copied().collect();
            common = common.intersection(&dates).copied().collect();
        }
        if common.len() < 2 {
            return Err(RiskAtlasError::DataUnavailable(format!(
                "only {} common return dates across {} series",
                common.len(),
                series.len()
            )));
        }
        let columns = series
            .iter()
            .map(|s| {
                s.dates
                    .iter()
                    .zip(&s.values)
                    .filter(|(d, _)| common.contains(d))
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        Ok(Self {
            symbols: series.iter().map(|s| s.symbol.clone()).collect(),
            dates: common.into_iter().collect(),
            columns,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, i: usize) -> &[f64] {
        &self.columns[i]
    }

    pub fn means(&self) -> Vec<f64> {
        self.columns.iter().map(|c| mean(c)).collect()
    }

    /// Sample covariance matrix.
    pub fn covariance(&self) -> Result<Vec<Vec<f64>>> {
        self.columns
            .iter()
            .map(|a| self.columns.iter().map(|b| covariance(a, b)).collect())
            .collect()
    }

    pub fn correlation(&self) -> Result<Vec<Vec<f64>>> {
        let cov = self.covariance()?;
        let sd: Vec<f64> = (0..cov.len()).map(|i| cov[i][i].sqrt()).collect();
        Ok(cov
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, c)| {
                        let denom = sd[i] * sd[j];
                        if denom > 0.0 {
                            c / denom
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn test_annualisation() {
        let series = PriceSeries::from_closes("X", start(), &[100.0, 101.0, 100.5, 102.0])
            .unwrap()
            .log_returns();
        assert_abs_diff_eq!(series.annualized_mean(252.0), series.mean() * 252.0);
        assert_abs_diff_eq!(
            series.annualized_volatility(CRYPTO_DAYS_PER_YEAR),
            series.std_dev() * 365.0_f64.sqrt()
        );
    }

    #[test]
    fn test_align_on_common_dates() {
        let a = PriceSeries::from_closes("A", start(), &[1.0, 1.1, 1.2, 1.1, 1.3])
            .unwrap()
            .log_returns();
        let later = start().succ_opt().unwrap();
        let b = PriceSeries::from_closes("B", later, &[2.0, 2.2, 2.1, 2.4, 2.3])
            .unwrap()
            .log_returns();
        let matrix = ReturnMatrix::align(&[a.clone(), b]).unwrap();
        assert_eq!(matrix.dates().len(), 3);
        assert_eq!(matrix.column(0), &a.values()[1..]);
        assert_eq!(matrix.symbols(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_covariance_and_correlation() {
        let a = PriceSeries::from_closes("A", start(), &[1.0, 1.1, 1.0, 1.2, 1.1])
            .unwrap()
            .log_returns();
        let matrix = ReturnMatrix::align(&[a.clone(), a.clone()]).unwrap();
        let cov = matrix.covariance().unwrap();
        assert_abs_diff_eq!(cov[0][0], a.std_dev().powi(2), epsilon = 1e-15);
        assert_abs_diff_eq!(cov[0][1], cov[1][0]);
        let corr = matrix.correlation().unwrap();
        assert_abs_diff_eq!(corr[0][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_align_without_overlap() {
        let a = PriceSeries::from_closes("A", start(), &[1.0, 1.1, 1.2])
            .unwrap()
            .log_returns();
        let far = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = PriceSeries::from_closes("B", far, &[1.0, 1.1, 1.2])
            .unwrap()
            .log_returns();
        assert!(matches!(
            ReturnMatrix::align(&[a, b]),
            Err(RiskAtlasError::DataUnavailable(_))
        ));
        assert!(ReturnMatrix::align(&[]).is_err());
    }
}
