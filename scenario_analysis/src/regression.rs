use crate::error::{AnalysisError, Result};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Polynomial with coefficients ordered from the highest power down, the
/// same layout `numpy.poly1d` uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyFit {
    pub coefficients: Vec<f64>,
}

impl PolyFit {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn evaluate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.evaluate(*x)).collect()
    }

    /// Coefficient of determination of the fit against `(xs, ys)`.
    pub fn r_squared(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let n = ys.len().min(xs.len());
        if n == 0 {
            return f64::NAN;
        }

        let mean = ys[..n].iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = ys[..n].iter().map(|y| (y - mean).powi(2)).sum();
        let ss_res: f64 = xs[..n]
            .iter()
            .zip(&ys[..n])
            .map(|(x, y)| (y - self.evaluate(*x)).powi(2))
            .sum();

        if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            f64::NAN
        }
    }
}

/// Least-squares polynomial fit of `y(x)`.
///
/// Solves the Vandermonde system by SVD after scaling each column to unit
/// norm, discarding singular values below `len(x) * eps` relative to the
/// largest one. This reproduces `numpy.polyfit` to floating-point tolerance.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<PolyFit> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }

    let order = degree + 1;
    if x.len() < order {
        return Err(AnalysisError::NotEnoughPoints {
            degree,
            needed: order,
            actual: x.len(),
        });
    }

    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFiniteInput);
    }

    let n = x.len();
    let mut lhs = DMatrix::from_fn(n, order, |i, j| x[i].powi((degree - j) as i32));

    let scale: Vec<f64> = (0..order)
        .map(|j| {
            let norm = lhs.column(j).norm();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        })
        .collect();
    for (j, s) in scale.iter().enumerate() {
        lhs.column_mut(j).scale_mut(1.0 / s);
    }

    let rhs = DVector::from_column_slice(y);
    let svd = lhs.svd(true, true);
    let cutoff = n as f64 * f64::EPSILON * svd.singular_values.max();
    let solution = svd
        .solve(&rhs, cutoff)
        .map_err(|e| AnalysisError::SolveFailed(e.to_string()))?;

    let coefficients: Vec<f64> = solution.iter().zip(&scale).map(|(c, s)| c / s).collect();
    debug!("Fitted degree {} polynomial: {:?}", degree, coefficients);

    Ok(PolyFit::new(coefficients))
}

/// Real day-ahead price regressed on residual load, alongside the model
/// price for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRegression {
    pub res_load: Vec<f64>,
    pub price_real: Vec<f64>,
    pub price_model: Vec<f64>,
    pub price_polynom_res_load: Vec<f64>,
    pub fit: PolyFit,
    pub r_squared: f64,
}

impl PriceRegression {
    /// Hours where residual load or real price is not finite are left out
    /// of the fit but kept in the evaluated series.
    pub fn fit(
        res_load: Vec<f64>,
        price_real: Vec<f64>,
        price_model: Vec<f64>,
        degree: usize,
    ) -> Result<Self> {
        for other in [price_real.len(), price_model.len()] {
            if other != res_load.len() {
                return Err(AnalysisError::LengthMismatch {
                    expected: res_load.len(),
                    actual: other,
                });
            }
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = res_load
            .iter()
            .zip(&price_real)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (*x, *y))
            .unzip();

        let dropped = res_load.len() - xs.len();
        if dropped > 0 {
            warn!("Leaving {} incomplete hours out of the price fit", dropped);
        }

        let fit = polyfit(&xs, &ys, degree)?;
        let r_squared = fit.r_squared(&xs, &ys);
        let price_polynom_res_load = fit.evaluate_all(&res_load);

        Ok(Self {
            res_load,
            price_real,
            price_model,
            price_polynom_res_load,
            fit,
            r_squared,
        })
    }

    /// Fitted curve sampled at the observed residual loads, ordered by x.
    pub fn curve(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self
            .res_load
            .iter()
            .zip(&self.price_polynom_res_load)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (*x, *y))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }

    /// Observed `(res_load, price_real)` pairs.
    pub fn scatter(&self) -> Vec<(f64, f64)> {
        self.res_load
            .iter()
            .zip(&self.price_real)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (*x, *y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{} != {} (tol {})", a, e, tol);
        }
    }

    #[test]
    fn test_linear_fit_matches_closed_form() {
        let fit = polyfit(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 8.0], 1).unwrap();
        assert_close(&fit.coefficients, &[2.3, 0.8], 1e-10);
    }

    #[test]
    fn test_cubic_recovered_exactly() {
        let xs: Vec<f64> = (0..200).map(|i| 20000.0 + 300.0 * i as f64).collect();
        let truth = PolyFit::new(vec![1.5e-12, -2.0e-7, 0.01, -120.0]);
        let ys = truth.evaluate_all(&xs);

        let fit = polyfit(&xs, &ys, 3).unwrap();

        assert_eq!(fit.degree(), 3);
        for (x, y) in xs.iter().zip(&ys) {
            assert!((fit.evaluate(*x) - y).abs() < 1e-4);
        }
        assert!((fit.r_squared(&xs, &ys) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_horner_matches_expanded_polynomial() {
        let z = [2.0, -1.0, 0.5, 3.0];
        let p = PolyFit::new(z.to_vec());
        let x: f64 = 1.7;
        let expanded = z[0] * x.powi(3) + z[1] * x.powi(2) + z[2] * x + z[3];
        assert!((p.evaluate(x) - expanded).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(matches!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0], 3),
            Err(AnalysisError::NotEnoughPoints { needed: 4, .. })
        ));
        assert!(matches!(
            polyfit(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1),
            Err(AnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            polyfit(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0], 1),
            Err(AnalysisError::NonFiniteInput)
        ));
    }

    #[test]
    fn test_price_regression_skips_incomplete_hours() {
        let res_load = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let price_real = vec![1.0, 3.0, f64::NAN, 7.0, 9.0];
        let price_model = vec![0.0; 5];

        let regression = PriceRegression::fit(res_load, price_real, price_model, 1).unwrap();

        assert_close(&regression.fit.coefficients, &[2.0, 1.0], 1e-10);
        assert_close(&regression.price_polynom_res_load, &[1.0, 3.0, 5.0, 7.0, 9.0], 1e-10);
        assert_eq!(regression.scatter().len(), 4);
        assert_eq!(regression.curve().len(), 5);
    }
}
