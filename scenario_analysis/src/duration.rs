use crate::config::Language;
use crate::error::{AnalysisError, Result};
use crate::models::{DispatchColumn, DispatchTable, Fuel, TimeSeries};
use std::cmp::Ordering;

/// Duration curves indexed by hour rank (0 = largest value).
#[derive(Debug, Clone)]
pub struct DurationCurves {
    pub columns: Vec<(DispatchColumn, Vec<f64>)>,
}

impl DurationCurves {
    pub fn get(&self, column: DispatchColumn) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, values)| values.as_slice())
    }

    pub fn hours(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    pub fn labelled(&self, columns: &[DispatchColumn], language: Language) -> Result<Vec<TimeSeries>> {
        columns
            .iter()
            .map(|c| {
                self.get(*c)
                    .map(|values| TimeSeries::new(c.label(language), values.to_vec()))
                    .ok_or_else(|| AnalysisError::MissingColumn(c.key().to_string()))
            })
            .collect()
    }
}

/// Descending order with `NaN` last.
fn descending(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(a),
    }
}

pub fn sort_descending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(descending);
    sorted
}

/// Every column sorted on its own, so hour `i` of one curve need not be the
/// same hour of another.
pub fn duration_curves(view: &DispatchTable) -> DurationCurves {
    DurationCurves {
        columns: view
            .columns
            .iter()
            .map(|(c, values)| (*c, sort_descending(values)))
            .collect(),
    }
}

/// Whole rows reordered by descending load (ties keep time order), with the
/// load itself appended as the last column.
pub fn duration_curves_by_load(view: &DispatchTable, load: &[f64]) -> Result<DurationCurves> {
    if load.len() != view.height() {
        return Err(AnalysisError::LengthMismatch {
            expected: view.height(),
            actual: load.len(),
        });
    }

    let mut order: Vec<usize> = (0..load.len()).collect();
    order.sort_by(|a, b| descending(&load[*a], &load[*b]));

    let reorder = |values: &[f64]| order.iter().map(|i| values[*i]).collect::<Vec<f64>>();

    let mut columns: Vec<(DispatchColumn, Vec<f64>)> = view
        .columns
        .iter()
        .map(|(c, values)| (*c, reorder(values)))
        .collect();
    columns.push((DispatchColumn::Fuel(Fuel::Load), reorder(load)));

    Ok(DurationCurves { columns })
}
