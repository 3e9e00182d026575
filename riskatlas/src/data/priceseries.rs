use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub close: f64,
}

/// # PriceSeries
/// Closing prices of one symbol, strictly increasing in date and strictly positive.
///
/// ## Example
/// ```
/// use chrono::NaiveDate;
/// use riskatlas::prelude::*;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let series = PriceSeries::from_closes("C", start, &[100.0, 101.0, 99.0]).unwrap();
/// let returns = series.log_returns();
/// assert_eq!(returns.len(), 2);
/// assert!((returns.values()[0] - (101.0_f64 / 100.0).ln()).abs() < 1e-15);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, observations: Vec<PriceObservation>) -> Result<Self> {
        let symbol = symbol.into();
        for obs in &observations {
            ensure_positive(&format!("{symbol} close on {}", obs.date), obs.close)?;
        }
        if observations.windows(2).any(|w| w[1].date <= w[0].date) {
            return Err(RiskAtlasError::InvalidParameter(format!(
                "{symbol} observations must be strictly increasing in date"
            )));
        }
        Ok(Self {
            symbol,
            observations,
        })
    }

    /// Series on consecutive calendar days starting at `start`.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let mut observations = Vec::with_capacity(closes.len());
        for (i, &close) in closes.iter().enumerate() {
            let date = start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                RiskAtlasError::InvalidParameter("date out of range".to_string())
            })?;
            observations.push(PriceObservation { date, close });
        }
        Self::new(symbol, observations)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    /// Observations with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .copied()
                .collect(),
        }
    }

    /// `log(p_t / p_{t-1})` dated at `t`; the first observation has no return.
    pub fn log_returns(&self) -> ReturnSeries {
        let (dates, values) = self
            .observations
            .windows(2)
            .map(|w| (w[1].date, (w[1].close / w[0].close).ln()))
            .unzip();
        ReturnSeries::new(self.symbol.clone(), dates, values)
    }
}
