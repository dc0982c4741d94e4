use crate::models::DescribeStats;
use statrs::statistics::Statistics;

/// Linear-interpolated quantile of sorted data, `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Summary statistics of one column with `NaN` skipped. The standard
/// deviation is the sample (n - 1) one.
pub fn describe(name: &str, values: &[f64]) -> DescribeStats {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    clean.sort_by(|a, b| a.total_cmp(b));

    let count = clean.len();
    let (mean, std) = match count {
        0 => (f64::NAN, f64::NAN),
        1 => (clean[0], f64::NAN),
        _ => (clean.iter().mean(), clean.iter().std_dev()),
    };

    DescribeStats {
        name: name.to_string(),
        count,
        mean,
        std,
        min: clean.first().copied().unwrap_or(f64::NAN),
        p25: quantile(&clean, 0.25),
        p50: quantile(&clean, 0.5),
        p75: quantile(&clean, 0.75),
        max: clean.last().copied().unwrap_or(f64::NAN),
    }
}
