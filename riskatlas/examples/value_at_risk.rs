// Value at Risk of a single position and of a two-asset portfolio built from price history.
use chrono::NaiveDate;
use riskatlas::prelude::*;

fn main() -> Result<()> {
    let aggregator = MonteCarloAggregator::new(100_000)?.with_seed(11);

    let params = VarParameters::new(1e6, 0.0005, 0.02, 0.99, 1);
    let comparison = compare_var(&params, &aggregator)?;
    println!("Analytical VaR: {:.2}", comparison.analytical.loss);
    println!("Monte Carlo VaR: {:.2}", comparison.monte_carlo.loss);
    println!("Difference: {:.2}", comparison.difference);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
    let source = InMemoryPriceSource::new()
        .with_series(PriceSeries::from_closes(
            "AAA",
            start,
            &[100.0, 101.2, 100.4, 102.0, 101.5, 103.1, 102.7, 104.0],
        )?)
        .with_series(PriceSeries::from_closes(
            "BBB",
            start,
            &[50.0, 49.6, 50.3, 50.1, 50.9, 50.4, 51.2, 51.0],
        )?);

    let returns = source.aligned_returns(&["AAA", "BBB"], start, end)?;
    let model = PortfolioModel::from_returns(&returns)?;
    let report = model.portfolio_var(&[0.5, 0.5], 1e6, 0.95, 1, &aggregator)?;
    for asset in &report.individual {
        println!("{} VaR: {:.2}", asset.symbol, asset.estimate.loss);
    }
    println!("Portfolio analytical VaR: {:.2}", report.portfolio.analytical.loss);
    println!("Portfolio Monte Carlo VaR: {:.2}", report.portfolio.monte_carlo.loss);

    let candidates = model.random_portfolios(TRADING_DAYS_PER_YEAR, &aggregator)?;
    if let Some(best) = max_sharpe_portfolio(&candidates) {
        println!(
            "Max Sharpe weights {:?} return {:.4} volatility {:.4} sharpe {:.4}",
            best.weights,
            best.statistics.expected_return,
            best.statistics.volatility,
            best.statistics.sharpe_ratio
        );
    }

    let optimum = model.optimize_max_sharpe(TRADING_DAYS_PER_YEAR, 1_000)?;
    println!(
        "Optimised weights {:?} return {:.4} volatility {:.4} sharpe {:.4}",
        optimum.weights,
        optimum.statistics.expected_return,
        optimum.statistics.volatility,
        optimum.statistics.sharpe_ratio
    );

    Ok(())
}
