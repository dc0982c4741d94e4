use scenario_analysis::regression::PriceRegression;

fn main() {
    // One synthetic week: residual load swings between night and day,
    // prices follow a convex merit order.
    let res_load: Vec<f64> = (0..24 * 7)
        .map(|h| {
            let hour = (h % 24) as f64;
            45000.0 + 15000.0 * (std::f64::consts::PI * hour / 24.0).sin()
        })
        .collect();
    let price_real: Vec<f64> = res_load
        .iter()
        .map(|x| 2e-12 * x.powi(3) - 1e-7 * x * x + 0.002 * x + 10.0)
        .collect();
    let price_model = price_real.iter().map(|p| p * 0.95).collect();

    let regression = match PriceRegression::fit(res_load, price_real, price_model, 3) {
        Ok(regression) => regression,
        Err(e) => {
            eprintln!("Fit failed: {}", e);
            return;
        }
    };

    println!("Price Fit");
    println!("=========");
    for (i, c) in regression.fit.coefficients.iter().enumerate() {
        println!("  z[{}] = {:.6e}", i, c);
    }
    println!("R²: {:.6}", regression.r_squared);
    println!();
    println!("{:>12} {:>12} {:>12}", "res_load", "price_real", "p(res_load)");
    for ((x, y), p) in regression
        .res_load
        .iter()
        .zip(&regression.price_real)
        .zip(&regression.price_polynom_res_load)
        .take(24)
    {
        println!("{:>12.0} {:>12.2} {:>12.2}", x, y, p);
    }
}
