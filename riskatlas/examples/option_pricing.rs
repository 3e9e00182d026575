// European call and put priced by Monte Carlo and compared against Black-Scholes.
use riskatlas::prelude::*;

fn main() -> Result<()> {
    let aggregator = MonteCarloAggregator::new(100_000)?.with_seed(42);

    for kind in [OptionKind::Call, OptionKind::Put] {
        let params = OptionParameters::new(100.0, 100.0, 1.0, 0.05, 0.2, kind);
        let quote = price_option(&params, &aggregator)?;
        println!("{:?} Monte Carlo price: {:.6}", kind, quote.price);
        println!("{:?} standard error: {:.6}", kind, quote.standard_error);
        println!("{:?} Black-Scholes price: {:.6}", kind, params.black_scholes_price());
        println!("{:?} difference: {:.6}", kind, quote.black_scholes_difference());
    }

    let (price, delta, gamma, theta) = call_price_greeks(100.0, 100.0, 0.05, 0.2, 1.0);
    println!("Call price {:.6} delta {:.6} gamma {:.6} theta {:.6}", price, delta, gamma, theta);

    Ok(())
}
