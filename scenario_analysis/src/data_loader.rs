use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::ScenarioTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use glob::glob;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

/// Scenario results together with the real prices aligned to them.
#[derive(Debug, Clone)]
pub struct ScenarioInputs {
    pub scenario_path: PathBuf,
    pub table: ScenarioTable,
    pub real_prices: Vec<f64>,
}

pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(10000),
        }
    }

    /// Resolve the scenario file and load it together with the real prices.
    pub fn load_inputs(&self, config: &AnalysisConfig) -> Result<ScenarioInputs> {
        let scenario_path = find_latest_scenario(&config.scenario_path)?;
        let table = self.load_scenario(&scenario_path)?;
        let real_prices = self.load_real_prices(&config.real_price_path, table.height())?;

        Ok(ScenarioInputs {
            scenario_path,
            table,
            real_prices,
        })
    }

    /// Load a scenario results CSV. The first column is the hourly index,
    /// every other column is read as `f64` with nulls mapped to `NaN`.
    pub fn load_scenario<P: AsRef<Path>>(&self, path: P) -> Result<ScenarioTable> {
        let path = path.as_ref();
        info!("Loading scenario results from {}", path.display());

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let table = frame_to_table(&df)?;
        info!(
            "Loaded {} rows x {} columns",
            table.height(),
            table.width()
        );
        Ok(table)
    }

    /// Load real day-ahead prices. Uses the `price` column when present,
    /// otherwise the last column, and requires one row per scenario hour.
    pub fn load_real_prices<P: AsRef<Path>>(&self, path: P, expected_rows: usize) -> Result<Vec<f64>> {
        let path = path.as_ref();
        info!("Loading real prices from {}", path.display());

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(AnalysisError::Empty(format!("{} has no columns", path.display())));
        }
        let price_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("price"))
            .unwrap_or(headers.len() - 1);
        debug!("Using price column '{}'", &headers[price_idx]);

        let mut prices = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cell = record.get(price_idx).unwrap_or_default();
            if cell.is_empty() {
                prices.push(f64::NAN);
                continue;
            }
            let price = cell.parse::<f64>().map_err(|_| AnalysisError::InvalidPrice {
                row,
                value: cell.to_string(),
            })?;
            prices.push(price);
        }

        if prices.len() != expected_rows {
            return Err(AnalysisError::LengthMismatch {
                expected: expected_rows,
                actual: prices.len(),
            });
        }

        Ok(prices)
    }
}

/// Convert a loaded frame into a [`ScenarioTable`].
pub fn frame_to_table(df: &DataFrame) -> Result<ScenarioTable> {
    let columns = df.get_columns();
    let (index_col, value_cols) = columns
        .split_first()
        .ok_or_else(|| AnalysisError::Empty("scenario file has no columns".to_string()))?;

    let index_strings = index_col.cast(&DataType::String)?;
    let index = index_strings
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.unwrap_or_default();
            parse_timestamp(value).ok_or_else(|| AnalysisError::InvalidTimestamp {
                row,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = ScenarioTable::new(index);
    for series in value_cols {
        let values: Vec<f64> = series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        table.push_column(&series.name().to_string(), values)?;
    }

    Ok(table)
}

/// Parse an index cell. Timezone offsets are dropped, keeping local time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Some(ts.naive_local());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A literal path is returned as-is when it exists; otherwise `pattern` is
/// globbed and the lexicographically last match wins (scenario file names
/// embed their creation timestamp).
pub fn find_latest_scenario(pattern: &str) -> Result<PathBuf> {
    let literal = PathBuf::from(pattern);
    if literal.is_file() {
        return Ok(literal);
    }

    let mut matches: Vec<PathBuf> = glob(pattern)?.filter_map(std::result::Result::ok).collect();
    matches.sort();
    debug!("{} scenario files match '{}'", matches.len(), pattern);

    matches
        .pop()
        .ok_or_else(|| AnalysisError::NoScenarioFile(pattern.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCENARIO_CSV: &str = "\
,DE_load,DE_wind,price_volatility
2014-01-01 00:00:00,100.5,20.0,30.0
2014-01-01 01:00:00,110.0,,31.5
2014-01-01 02:00:00,120.0,25.0,29.0
";

    #[test]
    fn test_load_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.csv");
        fs::write(&path, SCENARIO_CSV).unwrap();

        let table = DataLoader::new().load_scenario(&path).unwrap();

        assert_eq!(table.height(), 3);
        assert_eq!(table.column_names(), vec!["DE_load", "DE_wind", "price_volatility"]);
        assert_eq!(table.column("DE_load").unwrap(), &[100.5, 110.0, 120.0]);
        assert!(table.column("DE_wind").unwrap()[1].is_nan());
        assert_eq!(
            table.index[2],
            NaiveDateTime::parse_from_str("2014-01-01 02:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_load_real_prices_requires_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "hour,price\n0,30.1\n1,28.4\n").unwrap();

        let loader = DataLoader::new();
        assert_eq!(loader.load_real_prices(&path, 2).unwrap(), vec![30.1, 28.4]);
        assert!(matches!(
            loader.load_real_prices(&path, 3),
            Err(AnalysisError::LengthMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_load_real_prices_empty_and_invalid_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "hour,price\n0,30.1\n1,\n2,28.4\n").unwrap();

        let prices = DataLoader::new().load_real_prices(&path, 3).unwrap();
        assert_eq!(prices[0], 30.1);
        assert!(prices[1].is_nan());

        fs::write(&path, "hour,price\n0,30.1\n1,n/a\n").unwrap();
        match DataLoader::new().load_real_prices(&path, 2) {
            Err(AnalysisError::InvalidPrice { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "n/a");
            }
            other => panic!("expected InvalidPrice, got {:?}", other),
        }
    }

    #[test]
    fn test_load_real_prices_falls_back_to_last_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Date,EUR/MWh\n2014-01-01,30.1\n").unwrap();

        assert_eq!(DataLoader::new().load_real_prices(&path, 1).unwrap(), vec![30.1]);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2014-03-30 02:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2014-03-30 02:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2014-03-30T02:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2014-03-30 02:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_find_latest_scenario() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "scenario_nep_2014_2016-08-01 09:00:00_DE.csv",
            "scenario_nep_2014_2016-08-04 11:28:11_DE.csv",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let pattern = format!("{}/scenario_nep_2014_*_DE.csv", dir.path().display());
        let latest = find_latest_scenario(&pattern).unwrap();
        assert!(latest.ends_with("scenario_nep_2014_2016-08-04 11:28:11_DE.csv"));

        let missing = format!("{}/nothing_*.csv", dir.path().display());
        assert!(matches!(
            find_latest_scenario(&missing),
            Err(AnalysisError::NoScenarioFile(_))
        ));
    }
}
