// Zero-coupon bond under Vasicek: simulated short-rate paths against the closed form.
use riskatlas::prelude::*;

fn main() -> Result<()> {
    let model = VasicekModel::new(0.1, 0.3, 0.3, 0.03)?;
    let aggregator = MonteCarloAggregator::new(1000)?.with_seed(7);

    for points in [50, 200, 1000] {
        let params = VasicekBondParameters::new(1000.0, model, 1.0, points);
        let quote = price_bond(&params, &aggregator)?;
        println!(
            "{:>5} points: {:.4} +/- {:.4}",
            points, quote.price, quote.standard_error
        );
    }

    let params = VasicekBondParameters::new(1000.0, model, 1.0, 1000);
    println!("Closed form: {:.4}", params.closed_form_price());

    let sample = simulate_vasicek(0.1, 0.3, 0.3, 0.03, 1.0, 12, &mut seeded_rng(7))?;
    for (t, r) in sample.points() {
        println!("t = {:.3}  r = {:.5}", t, r);
    }

    Ok(())
}
