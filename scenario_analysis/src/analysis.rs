use crate::config::AnalysisConfig;
use crate::data_loader::ScenarioInputs;
use crate::dispatch::{to_gigawatt, DispatchAggregator, GIGAWATT};
use crate::duration::{duration_curves, duration_curves_by_load, DurationCurves};
use crate::error::Result;
use crate::models::{DescribeStats, DispatchColumn, DispatchTable, Fuel, ScenarioTable};
use crate::regression::PriceRegression;
use crate::residual_load::residual_load;
use crate::stats::describe;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fundamental model price columns compared in the price charts.
pub const PRICE_COLUMNS: [&str; 2] = ["price_volatility", "duals"];

/// Model price (dual of the energy balance) regressed against the real price.
pub const MODEL_PRICE_COLUMN: &str = "duals";

/// Headroom above the largest hourly dispatch total in the area chart.
pub const AREA_HEADROOM: f64 = 1.3;

/// Everything derived from one scenario run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub scenario_path: PathBuf,
    pub country_code: String,
    pub prices: ScenarioTable,
    pub price_stats: Vec<DescribeStats>,
    pub regression: PriceRegression,
    pub residual_load_stats: DescribeStats,
    pub dispatch: DispatchTable,
    pub dispatch_gw: DispatchTable,
    pub duration: DurationCurves,
    pub duration_by_load: DurationCurves,
}

impl AnalysisReport {
    /// Upper y limit of the dispatch area chart in GW.
    pub fn area_y_max(&self) -> f64 {
        self.dispatch_gw
            .row_totals()
            .into_iter()
            .fold(0.0, f64::max)
            * AREA_HEADROOM
    }

    pub fn summary(&self, config: &AnalysisConfig) -> AnalysisSummary {
        AnalysisSummary {
            scenario: self.scenario_path.display().to_string(),
            country_code: self.country_code.clone(),
            hours: self.prices.height(),
            polynomial: self.regression.fit.coefficients.clone(),
            r_squared: self.regression.r_squared,
            price_stats: self.price_stats.clone(),
            residual_load_stats: self.residual_load_stats.clone(),
            dispatch_totals_gwh: self
                .dispatch
                .column_totals()
                .into_iter()
                .map(|(c, total)| DispatchTotal {
                    column: c.key().to_string(),
                    label: c.label(config.language).to_string(),
                    energy_gwh: total / GIGAWATT,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchTotal {
    pub column: String,
    pub label: String,
    pub energy_gwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub scenario: String,
    pub country_code: String,
    pub hours: usize,
    pub polynomial: Vec<f64>,
    pub r_squared: f64,
    pub price_stats: Vec<DescribeStats>,
    pub residual_load_stats: DescribeStats,
    pub dispatch_totals_gwh: Vec<DispatchTotal>,
}

pub struct ScenarioAnalysis {
    config: AnalysisConfig,
}

impl ScenarioAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, inputs: ScenarioInputs) -> Result<AnalysisReport> {
        let ScenarioInputs {
            scenario_path,
            table,
            real_prices,
        } = inputs;

        let prices = table.select(&PRICE_COLUMNS)?;
        let price_stats = PRICE_COLUMNS
            .iter()
            .map(|name| Ok(describe(name, prices.column(name)?)))
            .collect::<Result<Vec<_>>>()?;

        let regions = self.config.regions();
        info!("Computing residual load over {:?}", regions);
        let res_load = residual_load(&table, &regions)?;
        let residual_load_stats = describe("res_load", &res_load);

        let regression = PriceRegression::fit(
            res_load,
            real_prices,
            table.column(MODEL_PRICE_COLUMN)?.to_vec(),
            self.config.polynomial_degree,
        )?;
        info!(
            "Price polynomial {:?} (R² {:.3})",
            regression.fit.coefficients, regression.r_squared
        );

        info!("Aggregating dispatch for {}", self.config.country_code);
        let aggregator = DispatchAggregator::new(&self.config.country_code)?;
        let dispatch = aggregator.aggregate(&table)?;
        let dispatch_gw = to_gigawatt(&dispatch)?;

        let duration = duration_curves(&dispatch_gw);
        let load_gw: Vec<f64> = dispatch
            .column(DispatchColumn::Fuel(Fuel::Load))?
            .iter()
            .map(|v| v / GIGAWATT)
            .collect();
        let duration_by_load = duration_curves_by_load(&dispatch_gw, &load_gw)?;

        Ok(AnalysisReport {
            scenario_path,
            country_code: self.config.country_code.clone(),
            prices,
            price_stats,
            regression,
            residual_load_stats,
            dispatch,
            dispatch_gw,
            duration,
            duration_by_load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn synthetic_inputs(hours: usize) -> ScenarioInputs {
        let start = NaiveDateTime::parse_from_str("2014-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let mut table =
            ScenarioTable::new((0..hours).map(|h| start + Duration::hours(h as i64)).collect());

        let wave = |h: usize, base: f64, amp: f64| base + amp * ((h % 24) as f64 / 24.0 * std::f64::consts::TAU).sin();
        let mut real_prices = Vec::with_capacity(hours);
        let mut columns: Vec<(&str, Vec<f64>)> = [
            "DE_load", "AT_load", "LU_load", "DE_wind", "AT_wind", "LU_wind", "DE_solar", "AT_solar",
            "LU_solar", "DE_lignite", "DE_gas", "powerline_AT_DE", "powerline_DE_AT", "phs_out_DE",
            "price_volatility", "duals",
        ]
        .into_iter()
        .map(|name| (name, Vec::with_capacity(hours)))
        .collect();

        for h in 0..hours {
            let load = wave(h, 60000.0, 10000.0);
            let wind = 8000.0 + (h % 7) as f64 * 1000.0;
            let values = [
                load, 7000.0, 700.0, wind, 800.0, 50.0, 2000.0, 100.0, 10.0, 15000.0, 9000.0,
                1200.0, 800.0, 300.0, 35.0, 32.0,
            ];
            for ((_, column), value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
            let residual = load + 7000.0 + 700.0 - wind - 800.0 - 50.0 - 2000.0 - 100.0 - 10.0;
            real_prices.push(1e-8 * residual * residual + 0.0001 * residual + 5.0);
        }

        for (name, values) in columns {
            table.push_column(name, values).unwrap();
        }

        ScenarioInputs {
            scenario_path: PathBuf::from("scenario.csv"),
            table,
            real_prices,
        }
    }

    #[test]
    fn test_run_end_to_end() {
        let report = ScenarioAnalysis::new(AnalysisConfig::default())
            .run(synthetic_inputs(24 * 14))
            .unwrap();

        assert_eq!(report.prices.width(), 2);
        assert_eq!(report.price_stats[0].name, "price_volatility");
        assert_eq!(report.regression.fit.degree(), 3);
        assert!(report.regression.r_squared > 0.999);
        assert_eq!(
            report.dispatch_gw.column(DispatchColumn::Fuel(Fuel::Lignite)).unwrap()[0],
            15.0
        );
        assert_eq!(report.dispatch_gw.column(DispatchColumn::Imports).unwrap()[0], 1.2);
        assert_eq!(report.duration.hours(), 24 * 14);
        assert!(report.duration_by_load.get(DispatchColumn::Fuel(Fuel::Load)).is_some());
    }

    #[test]
    fn test_area_y_max_has_headroom() {
        let report = ScenarioAnalysis::new(AnalysisConfig::default())
            .run(synthetic_inputs(48))
            .unwrap();

        let max_total = report.dispatch_gw.row_totals().into_iter().fold(0.0, f64::max);
        assert!((report.area_y_max() - max_total * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_summary_totals() {
        let config = AnalysisConfig::default();
        let report = ScenarioAnalysis::new(config.clone())
            .run(synthetic_inputs(24))
            .unwrap();
        let summary = report.summary(&config);

        let gas = summary
            .dispatch_totals_gwh
            .iter()
            .find(|t| t.column == "gas")
            .unwrap();
        assert_eq!(gas.label, "Gas");
        assert!((gas.energy_gwh - 24.0 * 9.0).abs() < 1e-9);
        assert_eq!(summary.polynomial.len(), 4);
    }
}
