use crate::error::Result;
use crate::models::ScenarioTable;

/// Signed inputs of the residual load: `(+1, "DE_load")`, `(-1, "DE_wind")` ...
/// Loads of all regions come first, then wind, then solar.
pub fn residual_load_columns(regions: &[&str]) -> Vec<(f64, String)> {
    let mut columns = Vec::with_capacity(regions.len() * 3);
    for (sign, quantity) in [(1.0, "load"), (-1.0, "wind"), (-1.0, "solar")] {
        for region in regions {
            columns.push((sign, format!("{}_{}", region, quantity)));
        }
    }
    columns
}

/// Total load minus wind and solar generation over `regions`, hour by hour.
/// A missing value in any input makes that hour `NaN`.
pub fn residual_load(table: &ScenarioTable, regions: &[&str]) -> Result<Vec<f64>> {
    let mut residual = vec![0.0; table.height()];

    for (sign, name) in residual_load_columns(regions) {
        let values = table.column(&name)?;
        for (acc, value) in residual.iter_mut().zip(values) {
            *acc += sign * value;
        }
    }

    Ok(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use chrono::{Duration, NaiveDateTime};

    fn table(columns: &[(&str, Vec<f64>)]) -> ScenarioTable {
        let start = NaiveDateTime::parse_from_str("2014-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let height = columns[0].1.len();
        let mut table =
            ScenarioTable::new((0..height).map(|h| start + Duration::hours(h as i64)).collect());
        for (name, values) in columns {
            table.push_column(name, values.clone()).unwrap();
        }
        table
    }

    #[test]
    fn test_residual_load_is_signed_sum() {
        let table = table(&[
            ("DE_load", vec![100.0, 200.0]),
            ("AT_load", vec![10.0, 20.0]),
            ("DE_wind", vec![30.0, 40.0]),
            ("AT_wind", vec![1.0, 2.0]),
            ("DE_solar", vec![5.0, 0.0]),
            ("AT_solar", vec![0.5, 0.0]),
            ("DE_hard_coal", vec![999.0, 999.0]),
        ]);

        let residual = residual_load(&table, &["DE", "AT"]).unwrap();
        assert_eq!(residual, vec![73.5, 178.0]);
    }

    #[test]
    fn test_residual_load_propagates_nan() {
        let table = table(&[
            ("LU_load", vec![1.0, f64::NAN]),
            ("LU_wind", vec![0.5, 0.5]),
            ("LU_solar", vec![0.0, 0.0]),
        ]);

        let residual = residual_load(&table, &["LU"]).unwrap();
        assert_eq!(residual[0], 0.5);
        assert!(residual[1].is_nan());
    }

    #[test]
    fn test_residual_load_requires_all_inputs() {
        let table = table(&[("DE_load", vec![1.0]), ("DE_wind", vec![0.5])]);
        assert!(matches!(
            residual_load(&table, &["DE"]),
            Err(AnalysisError::MissingColumn(name)) if name == "DE_solar"
        ));
    }

    #[test]
    fn test_residual_load_columns_order() {
        let names: Vec<String> = residual_load_columns(&["DE", "AT"])
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(
            names,
            vec!["DE_load", "AT_load", "DE_wind", "AT_wind", "DE_solar", "AT_solar"]
        );
    }
}
