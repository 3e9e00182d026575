use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::prelude::*;

/// Supplier of historical closing prices.
pub trait PriceSource {
    /// Closing prices of `symbol` with `start <= date <= end`. Implementors
    /// return [`RiskAtlasError::DataUnavailable`] rather than an empty series.
    fn closing_prices(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries>;

    /// Log returns of every symbol, aligned on the dates they share.
    fn aligned_returns(
        &self,
        symbols: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnMatrix> {
        let series = symbols
            .iter()
            .map(|s| Ok(self.closing_prices(s, start, end)?.log_returns()))
            .collect::<Result<Vec<_>>>()?;
        ReturnMatrix::align(&series)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.series.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl PriceSource for InMemoryPriceSource {
    fn closing_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let series = self.series.get(symbol).ok_or_else(|| {
            RiskAtlasError::DataUnavailable(format!("no prices stored for {symbol}"))
        })?;
        let window = series.between(start, end);
        if window.is_empty() {
            return Err(RiskAtlasError::DataUnavailable(format!(
                "no prices for {symbol} between {start} and {end}"
            )));
        }
        debug!(symbol, observations = window.len(), "loaded closing prices");
        Ok(window)
    }
}
