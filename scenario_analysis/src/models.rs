use crate::config::Language;
use crate::error::{AnalysisError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Hourly simulation results: a datetime index plus named numeric columns
/// kept in file order.
#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    pub index: Vec<NaiveDateTime>,
    columns: Vec<(String, Vec<f64>)>,
}

impl ScenarioTable {
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Adds a column, replacing an existing one with the same name.
    pub fn push_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(AnalysisError::LengthMismatch {
                expected: self.index.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    }

    /// Names of all columns accepted by `predicate`, in file order.
    pub fn columns_matching<F>(&self, predicate: F) -> Vec<&str>
    where
        F: Fn(&str) -> bool,
    {
        self.columns
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| predicate(name))
            .collect()
    }

    pub fn select(&self, names: &[&str]) -> Result<ScenarioTable> {
        let mut selected = ScenarioTable::new(self.index.clone());
        for name in names {
            selected.push_column(name, self.column(name)?.to_vec())?;
        }
        Ok(selected)
    }

    /// Row slice, clamped to the table height.
    pub fn slice_rows(&self, range: Range<usize>) -> ScenarioTable {
        let end = range.end.min(self.height());
        let start = range.start.min(end);

        ScenarioTable {
            index: self.index[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[start..end].to_vec()))
                .collect(),
        }
    }

    /// Rows whose calendar day lies within `start..=end`.
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> ScenarioTable {
        let first = self.index.iter().position(|ts| ts.date() >= start);
        let last = self.index.iter().rposition(|ts| ts.date() <= end);

        match (first, last) {
            (Some(first), Some(last)) if first <= last => self.slice_rows(first..last + 1),
            _ => self.slice_rows(0..0),
        }
    }

    /// Row-wise sum of the named columns. `NaN` cells are skipped and an
    /// empty selection sums to zero.
    pub fn sum_columns(&self, names: &[&str]) -> Result<Vec<f64>> {
        let mut totals = vec![0.0; self.height()];
        for name in names {
            for (total, value) in totals.iter_mut().zip(self.column(name)?) {
                if !value.is_nan() {
                    *total += value;
                }
            }
        }
        Ok(totals)
    }
}

/// A named series of hourly values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    RunOfRiver,
    Biomass,
    Solar,
    Wind,
    Uranium,
    Lignite,
    HardCoal,
    Gas,
    MixedFuels,
    Oil,
    Load,
    Excess,
    Shortage,
}

impl Fuel {
    pub const ALL: [Fuel; 13] = [
        Fuel::RunOfRiver,
        Fuel::Biomass,
        Fuel::Solar,
        Fuel::Wind,
        Fuel::Uranium,
        Fuel::Lignite,
        Fuel::HardCoal,
        Fuel::Gas,
        Fuel::MixedFuels,
        Fuel::Oil,
        Fuel::Load,
        Fuel::Excess,
        Fuel::Shortage,
    ];

    /// Substring identifying the fuel in result column names.
    pub fn key(&self) -> &'static str {
        match self {
            Fuel::RunOfRiver => "run_of_river",
            Fuel::Biomass => "biomass",
            Fuel::Solar => "solar",
            Fuel::Wind => "wind",
            Fuel::Uranium => "uranium",
            Fuel::Lignite => "lignite",
            Fuel::HardCoal => "hard_coal",
            Fuel::Gas => "gas",
            Fuel::MixedFuels => "mixed_fuels",
            Fuel::Oil => "oil",
            Fuel::Load => "load",
            Fuel::Excess => "excess",
            Fuel::Shortage => "shortage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchColumn {
    Fuel(Fuel),
    Imports,
    Exports,
    PhsIn,
    PhsOut,
    PhsLevel,
}

impl DispatchColumn {
    pub fn key(&self) -> &'static str {
        match self {
            DispatchColumn::Fuel(fuel) => fuel.key(),
            DispatchColumn::Imports => "imports",
            DispatchColumn::Exports => "exports",
            DispatchColumn::PhsIn => "phs_in",
            DispatchColumn::PhsOut => "phs_out",
            DispatchColumn::PhsLevel => "phs_level",
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.label_en(),
            Language::De => self.label_de(),
        }
    }

    fn label_en(&self) -> &'static str {
        match self {
            DispatchColumn::Fuel(Fuel::RunOfRiver) => "Run of river",
            DispatchColumn::Fuel(Fuel::Biomass) => "Biomass",
            DispatchColumn::Fuel(Fuel::Solar) => "Solar",
            DispatchColumn::Fuel(Fuel::Wind) => "Wind",
            DispatchColumn::Fuel(Fuel::Uranium) => "Nuclear",
            DispatchColumn::Fuel(Fuel::Lignite) => "Lignite",
            DispatchColumn::Fuel(Fuel::HardCoal) => "Hard coal",
            DispatchColumn::Fuel(Fuel::Gas) => "Gas",
            DispatchColumn::Fuel(Fuel::MixedFuels) => "Other",
            DispatchColumn::Fuel(Fuel::Oil) => "Oil",
            DispatchColumn::Fuel(Fuel::Load) => "Load",
            DispatchColumn::Fuel(Fuel::Excess) => "Excess",
            DispatchColumn::Fuel(Fuel::Shortage) => "Shortage",
            DispatchColumn::Imports => "Import",
            DispatchColumn::Exports => "Export",
            DispatchColumn::PhsIn => "Pumped storage in",
            DispatchColumn::PhsOut => "Pumped storage",
            DispatchColumn::PhsLevel => "Pumped storage level",
        }
    }

    fn label_de(&self) -> &'static str {
        match self {
            DispatchColumn::Fuel(Fuel::RunOfRiver) => "Laufwasser",
            DispatchColumn::Fuel(Fuel::Biomass) => "Biomasse",
            DispatchColumn::Fuel(Fuel::Solar) => "Solar",
            DispatchColumn::Fuel(Fuel::Wind) => "Wind",
            DispatchColumn::Fuel(Fuel::Uranium) => "Kernenergie",
            DispatchColumn::Fuel(Fuel::Lignite) => "Braunkohle",
            DispatchColumn::Fuel(Fuel::HardCoal) => "Steinkohle",
            DispatchColumn::Fuel(Fuel::Gas) => "Gas",
            DispatchColumn::Fuel(Fuel::MixedFuels) => "Sonstiges",
            DispatchColumn::Fuel(Fuel::Oil) => "Öl",
            DispatchColumn::Fuel(Fuel::Load) => "Last",
            DispatchColumn::Fuel(Fuel::Excess) => "Überschuss",
            DispatchColumn::Fuel(Fuel::Shortage) => "Defizit",
            DispatchColumn::Imports => "Import",
            DispatchColumn::Exports => "Export",
            DispatchColumn::PhsIn => "Pumpspeicher (Laden)",
            DispatchColumn::PhsOut => "Pumpspeicher",
            DispatchColumn::PhsLevel => "Speicherfüllstand",
        }
    }
}

/// Aggregated dispatch of one country, one column per fuel or flow.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    pub index: Vec<NaiveDateTime>,
    pub columns: Vec<(DispatchColumn, Vec<f64>)>,
}

impl DispatchTable {
    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn get(&self, column: DispatchColumn) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column(&self, column: DispatchColumn) -> Result<&[f64]> {
        self.get(column)
            .ok_or_else(|| AnalysisError::MissingColumn(column.key().to_string()))
    }

    pub fn select(&self, columns: &[DispatchColumn]) -> Result<DispatchTable> {
        let selected = columns
            .iter()
            .map(|c| Ok((*c, self.column(*c)?.to_vec())))
            .collect::<Result<Vec<_>>>()?;

        Ok(DispatchTable {
            index: self.index.clone(),
            columns: selected,
        })
    }

    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> DispatchTable {
        let first = self.index.iter().position(|ts| ts.date() >= start);
        let last = self.index.iter().rposition(|ts| ts.date() <= end);

        let range = match (first, last) {
            (Some(first), Some(last)) if first <= last => first..last + 1,
            _ => 0..0,
        };

        DispatchTable {
            index: self.index[range.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(c, values)| (*c, values[range.clone()].to_vec()))
                .collect(),
        }
    }

    /// Row-wise sum over all columns.
    pub fn row_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.height()];
        for (_, values) in &self.columns {
            for (total, value) in totals.iter_mut().zip(values) {
                if !value.is_nan() {
                    *total += value;
                }
            }
        }
        totals
    }

    /// Sum over time per column.
    pub fn column_totals(&self) -> Vec<(DispatchColumn, f64)> {
        self.columns
            .iter()
            .map(|(c, values)| (*c, values.iter().filter(|v| !v.is_nan()).sum()))
            .collect()
    }
}

/// pandas-style `describe()` summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn hourly_index(start: &str, hours: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").unwrap();
        (0..hours)
            .map(|h| start + Duration::hours(h as i64))
            .collect()
    }

    #[test]
    fn test_missing_column_is_reported_by_name() {
        let table = ScenarioTable::new(hourly_index("2014-01-01 00:00:00", 2))
            .with_column("DE_load", vec![1.0, 2.0])
            .unwrap();

        match table.column("AT_load") {
            Err(AnalysisError::MissingColumn(name)) => assert_eq!(name, "AT_load"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_push_column_rejects_wrong_length() {
        let mut table = ScenarioTable::new(hourly_index("2014-01-01 00:00:00", 3));
        assert!(matches!(
            table.push_column("DE_load", vec![1.0]),
            Err(AnalysisError::LengthMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_sum_columns_skips_nan() {
        let table = ScenarioTable::new(hourly_index("2014-01-01 00:00:00", 2))
            .with_column("a", vec![1.0, f64::NAN])
            .unwrap()
            .with_column("b", vec![2.0, 3.0])
            .unwrap();

        assert_eq!(table.sum_columns(&["a", "b"]).unwrap(), vec![3.0, 3.0]);
        assert_eq!(table.sum_columns(&[]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_rows_between_is_inclusive_by_day() {
        let table = ScenarioTable::new(hourly_index("2014-01-01 00:00:00", 24 * 5))
            .with_column("x", (0..120).map(f64::from).collect())
            .unwrap();

        let week = table.rows_between(
            NaiveDate::from_ymd_opt(2014, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2014, 1, 3).unwrap(),
        );

        assert_eq!(week.height(), 48);
        assert_eq!(week.column("x").unwrap()[0], 24.0);
        assert_eq!(week.column("x").unwrap()[47], 71.0);
    }

    #[test]
    fn test_slice_rows_clamps() {
        let table = ScenarioTable::new(hourly_index("2014-01-01 00:00:00", 10))
            .with_column("x", vec![0.0; 10])
            .unwrap();
        assert_eq!(table.slice_rows(0..24 * 7 * 8).height(), 10);
    }

    #[test]
    fn test_dispatch_labels() {
        let storage = DispatchColumn::PhsOut;
        assert_eq!(storage.label(Language::De), "Pumpspeicher");
        assert_eq!(DispatchColumn::Fuel(Fuel::Uranium).label(Language::De), "Kernenergie");
        assert_eq!(DispatchColumn::Fuel(Fuel::Uranium).label(Language::En), "Nuclear");
    }

    #[test]
    fn test_time_series_extremes_skip_nan() {
        let series = TimeSeries::new("Wind", vec![3.0, f64::NAN, -1.5, 7.25]);
        assert_eq!(series.max(), 7.25);
        assert_eq!(series.min(), -1.5);
    }
}
